//! Stub backing objects shared by the unit tests.

use crate::api::{AcquisitionInterface, BackingObjectSet, Camera, ClockMode, HeadVoltage};
use std::sync::{Arc, Mutex};

#[ctor::ctor]
fn prepare_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .init();
}

/// Assemble a backing set from stub objects.
pub(crate) fn stub_backing(
    camera: &Arc<StubCamera>,
    interface: &Arc<StubInterface>,
) -> BackingObjectSet {
    BackingObjectSet {
        interface: Arc::clone(interface) as Arc<dyn AcquisitionInterface>,
        camera: Arc::clone(camera) as Arc<dyn Camera>,
    }
}

/// Records every camera call as a formatted string and answers with canned
/// values; when `fail_with` is set, every call fails with that message.
#[derive(Debug)]
pub(crate) struct StubCamera {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) temperature: f64,
    pub(crate) max_frames: String,
    pub(crate) fail_with: Option<String>,
}

impl Default for StubCamera {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            temperature: 21.5,
            max_frames: "1024".to_owned(),
            fail_with: None,
        }
    }
}

impl StubCamera {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> eyre::Result<()> {
        if let Some(message) = &self.fail_with {
            eyre::bail!("{message}");
        }
        self.calls.lock().unwrap().push(call.into());
        Ok(())
    }
}

impl Camera for StubCamera {
    fn reset(&self) -> eyre::Result<()> {
        self.record("reset")
    }

    fn send_command(&self, cmd: &str) -> eyre::Result<()> {
        self.record(format!("send_command({cmd})"))
    }

    fn send_command_number(&self, cmd: &str) -> eyre::Result<f64> {
        self.record(format!("send_command_number({cmd})"))?;
        Ok(42.0)
    }

    fn send_command_string(&self, cmd: &str) -> eyre::Result<String> {
        self.record(format!("send_command_string({cmd})"))?;
        Ok("ok".to_owned())
    }

    fn enable_hv(&self, enable: bool) -> eyre::Result<()> {
        self.record(format!("enable_hv({enable})"))
    }

    fn set_head_caps(&self, caps_ab: i64, caps_cd: i64) -> eyre::Result<()> {
        self.record(format!("set_head_caps({caps_ab}, {caps_cd})"))
    }

    fn set_head_dac(
        &self,
        value: f64,
        voltage: HeadVoltage,
        head: i64,
        direct: bool,
    ) -> eyre::Result<()> {
        self.record(format!("set_head_dac({value}, {voltage:?}, {head}, {direct})"))
    }

    fn list_available_caps(&self) -> eyre::Result<Vec<i16>> {
        self.record("list_available_caps")?;
        Ok(vec![2, 4, 6, 36])
    }

    fn available_trigger_modes(&self) -> eyre::Result<Vec<String>> {
        self.record("available_trigger_modes")?;
        Ok(vec!["IntTrig".to_owned(), "ExtGate".to_owned()])
    }

    fn set_timing_script(&self, name: &str) -> eyre::Result<()> {
        self.record(format!("set_timing_script({name})"))
    }

    fn timing_script(&self) -> eyre::Result<String> {
        self.record("timing_script")?;
        Ok("config_timing_1turn".to_owned())
    }

    fn temperature(&self, channel: i64) -> eyre::Result<f64> {
        self.record(format!("temperature({channel})"))?;
        Ok(self.temperature)
    }

    fn cool_down(&self) -> eyre::Result<()> {
        self.record("cool_down")
    }

    fn power_down(&self) -> eyre::Result<()> {
        self.record("power_down")
    }

    fn setup_clock(&self, mode: ClockMode) -> eyre::Result<()> {
        self.record(format!("setup_clock({})", i64::from(mode)))
    }

    fn nb_scans(&self) -> eyre::Result<i64> {
        self.record("nb_scans")?;
        Ok(1)
    }

    fn set_nb_scans(&self, nb_scans: i64) -> eyre::Result<()> {
        self.record(format!("set_nb_scans({nb_scans})"))
    }

    fn max_frames(&self) -> eyre::Result<String> {
        self.record("max_frames")?;
        Ok(self.max_frames.clone())
    }

    fn lemo_out(&self) -> eyre::Result<Vec<i64>> {
        self.record("lemo_out")?;
        Ok(vec![0, 1, 2])
    }

    fn set_lemo_out(&self, signals: &[i64]) -> eyre::Result<()> {
        self.record(format!("set_lemo_out({signals:?})"))
    }

    fn bias(&self) -> eyre::Result<f64> {
        self.record("bias")?;
        Ok(90.0)
    }

    fn set_custom_trigger_mode(&self, mode: &str) -> eyre::Result<()> {
        self.record(format!("set_custom_trigger_mode({mode})"))
    }

    fn set_timing_orbit(&self, delay: i64, falling_edge: bool) -> eyre::Result<()> {
        self.record(format!("set_timing_orbit({delay}, {falling_edge})"))
    }

    fn trig_mux(&self) -> eyre::Result<i64> {
        self.record("trig_mux")?;
        Ok(9)
    }

    fn set_trig_mux(&self, mux: i64) -> eyre::Result<()> {
        self.record(format!("set_trig_mux({mux})"))
    }

    fn orbit_trigger(&self) -> eyre::Result<i64> {
        self.record("orbit_trigger")?;
        Ok(0)
    }

    fn set_orbit_trigger(&self, mux: i64) -> eyre::Result<()> {
        self.record(format!("set_orbit_trigger({mux})"))
    }

    fn correct_rounding(&self) -> eyre::Result<bool> {
        self.record("correct_rounding")?;
        Ok(false)
    }

    fn set_correct_rounding(&self, enable: bool) -> eyre::Result<()> {
        self.record(format!("set_correct_rounding({enable})"))
    }

    fn group_delay(&self) -> eyre::Result<i64> {
        self.record("group_delay")?;
        Ok(0)
    }

    fn set_group_delay(&self, delay: i64) -> eyre::Result<()> {
        self.record(format!("set_group_delay({delay})"))
    }

    fn frame_delay(&self) -> eyre::Result<i64> {
        self.record("frame_delay")?;
        Ok(0)
    }

    fn set_frame_delay(&self, delay: i64) -> eyre::Result<()> {
        self.record(format!("set_frame_delay({delay})"))
    }

    fn scan_period(&self) -> eyre::Result<i64> {
        self.record("scan_period")?;
        Ok(0)
    }

    fn set_scan_period(&self, period: i64) -> eyre::Result<()> {
        self.record(format!("set_scan_period({period})"))
    }

    fn aux_delay(&self) -> eyre::Result<i64> {
        self.record("aux_delay")?;
        Ok(0)
    }

    fn set_aux_delay(&self, delay: i64) -> eyre::Result<()> {
        self.record(format!("set_aux_delay({delay})"))
    }

    fn aux_width(&self) -> eyre::Result<i64> {
        self.record("aux_width")?;
        Ok(1)
    }

    fn set_aux_width(&self, width: i64) -> eyre::Result<()> {
        self.record(format!("set_aux_width({width})"))
    }
}

/// Interface stub holding the one acquisition-level attribute.
#[derive(Debug, Default)]
pub(crate) struct StubInterface {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) nb_groups: Mutex<i64>,
}

impl StubInterface {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AcquisitionInterface for StubInterface {
    fn nb_groups(&self) -> eyre::Result<i64> {
        self.calls.lock().unwrap().push("nb_groups".to_owned());
        Ok(*self.nb_groups.lock().unwrap())
    }

    fn set_nb_groups(&self, nb_groups: i64) -> eyre::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_nb_groups({nb_groups})"));
        *self.nb_groups.lock().unwrap() = nb_groups;
        Ok(())
    }
}
