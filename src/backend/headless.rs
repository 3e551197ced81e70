//! Headless backend
//!
//! Records every call instead of talking to a device. Handy for tests,
//! for counting binds, and for running the frame loop on machines without
//! a GPU. Device loss can be simulated with [`HeadlessBackend::lose_device`].

use rustc_hash::FxHashSet;

use super::{BackendHandle, BindSlot, GpuBackend, ResourceKind};
use crate::errors::{Result, VesperError};
use crate::resources::ResourceDesc;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Create {
        handle: BackendHandle,
        kind: ResourceKind,
    },
    Destroy {
        handle: BackendHandle,
    },
    Bind {
        handle: BackendHandle,
        slot: BindSlot,
    },
    Write {
        handle: BackendHandle,
        len: usize,
    },
    Draw {
        count: u32,
        start: u32,
        base_vertex: i32,
    },
    Clear {
        /// `f32::to_bits` of each channel, so calls stay `Eq`.
        rgba: [u32; 4],
    },
    Present,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    calls: Vec<BackendCall>,
    live: FxHashSet<BackendHandle>,
    lost: Option<String>,
    frames_presented: u64,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded since creation (or the last [`take_calls`](Self::take_calls)).
    #[inline]
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Bind calls in submission order.
    pub fn binds(&self) -> impl Iterator<Item = (BackendHandle, BindSlot)> + '_ {
        self.calls.iter().filter_map(|call| match call {
            BackendCall::Bind { handle, slot } => Some((*handle, *slot)),
            _ => None,
        })
    }

    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.binds().count()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Draw { .. }))
            .count()
    }

    #[must_use]
    pub fn create_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Create { .. }))
            .count()
    }

    /// Number of objects created and not yet destroyed.
    #[inline]
    #[must_use]
    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: BackendHandle) -> bool {
        self.live.contains(&handle)
    }

    #[inline]
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Simulates device removal: every object is gone and every subsequent
    /// call fails with [`VesperError::DeviceLost`].
    pub fn lose_device(&mut self, reason: &str) {
        log::warn!("HeadlessBackend: simulating device loss ({reason})");
        self.lost = Some(reason.to_string());
        self.live.clear();
    }

    #[inline]
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.lost.is_some()
    }

    fn check_device(&self) -> Result<()> {
        match &self.lost {
            Some(reason) => Err(VesperError::DeviceLost(reason.clone())),
            None => Ok(()),
        }
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_resource(&mut self, kind: ResourceKind, desc: &ResourceDesc) -> Result<BackendHandle> {
        self.check_device()?;
        if desc.kind() != kind {
            return Err(VesperError::Backend(format!(
                "description of a {:?} used to create a {kind:?}",
                desc.kind()
            )));
        }
        self.next_handle += 1;
        let handle = BackendHandle(self.next_handle);
        self.live.insert(handle);
        self.calls.push(BackendCall::Create { handle, kind });
        Ok(handle)
    }

    fn bind(&mut self, handle: BackendHandle, slot: BindSlot) -> Result<()> {
        self.check_device()?;
        if !self.live.contains(&handle) {
            return Err(VesperError::Backend(format!(
                "bind of unknown object {handle:?} at {slot:?}"
            )));
        }
        self.calls.push(BackendCall::Bind { handle, slot });
        Ok(())
    }

    fn issue_draw(&mut self, count: u32, start: u32, base_vertex: i32) -> Result<()> {
        self.check_device()?;
        self.calls.push(BackendCall::Draw {
            count,
            start,
            base_vertex,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.check_device()?;
        self.frames_presented += 1;
        self.calls.push(BackendCall::Present);
        Ok(())
    }

    fn clear(&mut self, rgba: [f32; 4]) -> Result<()> {
        self.check_device()?;
        self.calls.push(BackendCall::Clear {
            rgba: rgba.map(f32::to_bits),
        });
        Ok(())
    }

    fn destroy_resource(&mut self, handle: BackendHandle) {
        if self.live.remove(&handle) {
            self.calls.push(BackendCall::Destroy { handle });
        }
    }

    fn write_resource(&mut self, handle: BackendHandle, data: &[u8]) -> Result<()> {
        self.check_device()?;
        if !self.live.contains(&handle) {
            return Err(VesperError::Backend(format!(
                "write to unknown object {handle:?}"
            )));
        }
        self.calls.push(BackendCall::Write {
            handle,
            len: data.len(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_device_rejects_every_call() {
        let mut backend = HeadlessBackend::new();
        let desc = ResourceDesc::Topology(crate::resources::PrimitiveTopology::TriangleList);
        let handle = backend
            .create_resource(ResourceKind::Topology, &desc)
            .unwrap();

        backend.lose_device("test");

        assert!(backend.create_resource(ResourceKind::Topology, &desc).unwrap_err().is_device_lost());
        assert!(backend.bind(handle, BindSlot::single(ResourceKind::Topology)).unwrap_err().is_device_lost());
        assert!(backend.present().unwrap_err().is_device_lost());
        assert_eq!(backend.live_resources(), 0);
    }
}
