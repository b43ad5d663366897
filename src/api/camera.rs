use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::Debug;

/// Detector clock source, with the codes `setup_clock` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum ClockMode {
    /// Internal 20 ns clock.
    Internal = 0,
    /// ESRF 54.68 MHz clock.
    Esrf5468MHz = 1,
    /// ESRF RF/31 clock, 11.36 MHz.
    Esrf1136MHz = 2,
}

/// Head DAC voltage selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
#[expect(missing_docs)]
pub enum HeadVoltage {
    Vdd = 0,
    Vref = 1,
    Vrefc = 2,
    Vres1 = 3,
    Vres2 = 4,
    Vpupref = 5,
    Vclamp = 6,
    Vled = 7,
}

/// The low-level camera object controlling the Xh detector head.
///
/// Every method forwards to the da.server connection owned by the wrapped
/// acquisition library; nothing is cached or retried here.
pub trait Camera: Debug + Send + Sync {
    /// Full reset: re-runs the configuration command file.
    fn reset(&self) -> eyre::Result<()>;

    /// Send a raw textual da.server command, discarding any reply.
    fn send_command(&self, cmd: &str) -> eyre::Result<()>;

    /// Send a raw textual command and read back a numeric reply.
    fn send_command_number(&self, cmd: &str) -> eyre::Result<f64>;

    /// Send a raw textual command and read back a string reply.
    fn send_command_string(&self, cmd: &str) -> eyre::Result<String>;

    /// Switch the high-voltage supply on or off.
    fn enable_hv(&self, enable: bool) -> eyre::Result<()>;

    /// Configure the head capacitance pair (AB and CD banks).
    fn set_head_caps(&self, caps_ab: i64, caps_cd: i64) -> eyre::Result<()>;

    /// Program one of the head DAC voltages. `head` of -1 addresses all
    /// heads; `direct` bypasses the calibration table.
    fn set_head_dac(
        &self,
        value: f64,
        voltage: HeadVoltage,
        head: i64,
        direct: bool,
    ) -> eyre::Result<()>;

    /// The capacitance values supported by the connected heads.
    fn list_available_caps(&self) -> eyre::Result<Vec<i16>>;

    /// Names of the trigger modes the detector supports.
    fn available_trigger_modes(&self) -> eyre::Result<Vec<String>>;

    /// Select a timing script by name.
    fn set_timing_script(&self, name: &str) -> eyre::Result<()>;

    /// The currently selected timing script.
    fn timing_script(&self) -> eyre::Result<String>;

    /// Temperature of one readout channel, in degrees Celsius.
    fn temperature(&self, channel: i64) -> eyre::Result<f64>;

    /// Start the Peltier cool-down sequence.
    fn cool_down(&self) -> eyre::Result<()>;

    /// Power the detector head down.
    fn power_down(&self) -> eyre::Result<()>;

    /// Select the detector clock source.
    fn setup_clock(&self, mode: ClockMode) -> eyre::Result<()>;

    /// Number of scans summed per frame.
    fn nb_scans(&self) -> eyre::Result<i64>;
    /// Set the number of scans summed per frame.
    fn set_nb_scans(&self, nb_scans: i64) -> eyre::Result<()>;

    /// Maximum frame count for the current configuration, as the raw decimal
    /// string reported by da.server.
    fn max_frames(&self) -> eyre::Result<String>;

    /// Current lemo output routing.
    fn lemo_out(&self) -> eyre::Result<Vec<i64>>;
    /// Route the lemo outputs.
    fn set_lemo_out(&self, signals: &[i64]) -> eyre::Result<()>;

    /// Detector bias voltage readback.
    fn bias(&self) -> eyre::Result<f64>;

    /// Install a custom trigger-mode string.
    fn set_custom_trigger_mode(&self, mode: &str) -> eyre::Result<()>;

    /// Program the orbit trigger delay; `falling_edge` selects the edge.
    fn set_timing_orbit(&self, delay: i64, falling_edge: bool) -> eyre::Result<()>;

    /// Trigger mux selection (lemo 0..7, 8 = delayed orbit, 9 = software).
    fn trig_mux(&self) -> eyre::Result<i64>;
    /// Select the trigger mux input.
    fn set_trig_mux(&self, mux: i64) -> eyre::Result<()>;

    /// Orbit mux trigger selection.
    fn orbit_trigger(&self) -> eyre::Result<i64>;
    /// Select the orbit mux trigger.
    fn set_orbit_trigger(&self, mux: i64) -> eyre::Result<()>;

    /// Whether group and frame delays are rounded to the exact frame time.
    fn correct_rounding(&self) -> eyre::Result<bool>;
    /// Enable or disable delay rounding correction.
    fn set_correct_rounding(&self, enable: bool) -> eyre::Result<()>;

    /// Delay added before each timing group.
    fn group_delay(&self) -> eyre::Result<i64>;
    /// Set the delay added before each timing group.
    fn set_group_delay(&self, delay: i64) -> eyre::Result<()>;

    /// Delay added before each frame.
    fn frame_delay(&self) -> eyre::Result<i64>;
    /// Set the delay added before each frame.
    fn set_frame_delay(&self, delay: i64) -> eyre::Result<()>;

    /// Scan period (default packs scans as close as possible).
    fn scan_period(&self) -> eyre::Result<i64>;
    /// Set the scan period.
    fn set_scan_period(&self, period: i64) -> eyre::Result<()>;

    /// Aux signal delay.
    fn aux_delay(&self) -> eyre::Result<i64>;
    /// Set the aux signal delay.
    fn set_aux_delay(&self, delay: i64) -> eyre::Result<()>;

    /// Aux signal pulse width.
    fn aux_width(&self) -> eyre::Result<i64>;
    /// Set the aux signal pulse width.
    fn set_aux_width(&self, width: i64) -> eyre::Result<()>;
}
