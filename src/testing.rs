use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::device::DeviceController;
use crate::error::{BackuperError, DeviceError, Result};
use crate::notify::Notifier;
use crate::scheduler::clock::{Clock, Sleeper};
use crate::types::VolumeId;
use crate::util::command::{describe_command, CommandOutput, CommandRunner};

enum Reply {
    Output(CommandOutput),
    SpawnError,
}

/// Records every command line and answers from prefix rules; unmatched
/// commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: RefCell<Vec<(String, Reply)>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.rules
            .borrow_mut()
            .push((prefix.to_string(), Reply::Output(output)));
    }

    pub fn fail_spawn(&self, prefix: &str) {
        self.rules
            .borrow_mut()
            .push((prefix.to_string(), Reply::SpawnError));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, cmd: &mut Command) -> Result<CommandOutput> {
        let line = describe_command(cmd);
        self.calls.borrow_mut().push(line.clone());
        for (prefix, reply) in self.rules.borrow().iter() {
            if line.starts_with(prefix.as_str()) {
                return match reply {
                    Reply::Output(output) => Ok(output.clone()),
                    Reply::SpawnError => Err(BackuperError::message(format!(
                        "{}: No such file or directory",
                        line
                    ))),
                };
            }
        }
        Ok(CommandOutput::ok())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(title, _)| title.clone()).collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

/// Presence answers come from a queue; once it drains the device is absent.
#[derive(Default)]
pub struct FakeDevices {
    presence: RefCell<VecDeque<bool>>,
    events: RefCell<Vec<String>>,
    fail_mount: Cell<bool>,
}

impl FakeDevices {
    pub fn with_presence(presence: &[bool]) -> Self {
        let devices = Self::default();
        devices.presence.borrow_mut().extend(presence.iter().copied());
        devices
    }

    pub fn fail_mounts(&self) {
        self.fail_mount.set(true);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }
}

impl DeviceController for FakeDevices {
    fn mount(&self, volume: &VolumeId, mountpoint: &Path) -> Result<()> {
        self.events
            .borrow_mut()
            .push(format!("mount {} {}", volume, mountpoint.display()));
        if self.fail_mount.get() {
            return Err(DeviceError::MountFailure(format!("{} failed with exit code 32", volume)).into());
        }
        Ok(())
    }

    fn unmount(&self, mountpoint: &Path) -> Result<()> {
        self.events
            .borrow_mut()
            .push(format!("unmount {}", mountpoint.display()));
        Ok(())
    }

    fn spin_down(&self, devices: &[PathBuf]) -> Vec<BackuperError> {
        let mut events = self.events.borrow_mut();
        for device in devices {
            events.push(format!("spindown {}", device.display()));
        }
        Vec::new()
    }

    fn is_present(&self, _volume: &VolumeId) -> bool {
        self.presence.borrow_mut().pop_front().unwrap_or(false)
    }
}

pub struct FakeClock {
    now: Cell<NaiveDateTime>,
}

impl FakeClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
