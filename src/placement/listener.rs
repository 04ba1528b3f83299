//! Notification sink for voxel occupancy changes.

use log::trace;

use crate::voxels::voxel::Voxel;

/// Receives every change of a voxel's state or colour.
///
/// Notifications are fire-and-forget: the placement layer never waits on or
/// reads anything back from a listener.
pub trait VoxelListener: Send {
    /// Called after `voxel` changed.
    fn voxel_changed(&mut self, voxel: &Voxel);
}

/// A listener that writes each change to the `trace` log.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogListener;

impl VoxelListener for LogListener {
    fn voxel_changed(&mut self, voxel: &Voxel) {
        trace!(
            "Voxel {:?} is now {:?} ({:?})",
            voxel.index,
            voxel.state(),
            voxel.color()
        );
    }
}
