// Keyswap Device Session
// Ties one physical device to its rule table and virtual mirrors

use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::DeviceConfig;
use crate::debug::DebugLog;
use crate::event::{CancelToken, EvdevSource, EventRouter, RouterError};
use crate::output::{capabilities_of, create_mirror, EventSink, MirrorDevices, MirrorError, MirrorPlan};
use crate::remap::RuleTable;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to access device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Router(#[from] RouterError),
}

/// One grabbed device plus its virtual mirrors and rule table.
///
/// Field order matters for teardown: the virtual devices are destroyed
/// before the physical device handle closes, and `Drop` releases the
/// grab before either.
pub struct DeviceSession {
    rules: RuleTable,
    mirror: MirrorDevices,
    source: EvdevSource,
}

impl DeviceSession {
    /// Open, grab, and mirror the device at `path`.
    ///
    /// A failed grab is downgraded to a warning: routing still works, the
    /// desktop just sees each unmatched event twice.
    pub fn open(path: &Path, config: &DeviceConfig) -> Result<Self, SessionError> {
        let device = evdev::raw_stream::RawDevice::open(path).map_err(|source| SessionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut source = EvdevSource::new(device);

        let caps = capabilities_of(source.device()).map_err(|e| SessionError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let plan = MirrorPlan::build(&caps, &config.rules);
        let mirror = create_mirror(&plan)?;

        if let Err(e) = source.grab() {
            warn!("'{}': failed to grab device: {e}", source.name());
        }

        info!(
            "'{}': session ready ({} rules, {} forwarded keys)",
            source.name(),
            config.rules.len(),
            plan.forward_keys.len()
        );

        Ok(Self {
            rules: config.rules.clone(),
            mirror,
            source,
        })
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Route events until cancelled or the device becomes unreadable.
    pub fn run(
        &mut self,
        debug_log: Option<&mut DebugLog>,
        cancel: &CancelToken,
    ) -> Result<(), SessionError> {
        let name = self.source.name().to_string();
        let forward = self
            .mirror
            .forward
            .as_mut()
            .map(|device| device as &mut dyn EventSink);

        let mut router = EventRouter::new(
            &mut self.source,
            &self.rules,
            &mut self.mirror.inject,
            forward,
            debug_log,
            &name,
        );
        router.run(cancel)?;
        Ok(())
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        // Release the grab before the virtual devices disappear so the
        // physical device is never left unreachable.
        self.source.ungrab();
    }
}
