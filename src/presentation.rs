//! Presentation surfaces - scoped acquisition of a top-level overlay surface
//!
//! Showing an overlay acquires a full-screen surface from the host (a window
//! above everything else, or the terminal's alternate screen). The surface is
//! held by a `SurfaceGuard` and released when the guard is dropped, so every
//! way an overlay goes away gives the surface back.

use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// Host-assigned surface handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Host side of overlay presentation
pub trait PresentationHost {
    /// Create a full-screen surface above all other content and make it
    /// visible and focused
    fn acquire_surface(&mut self, animated: bool) -> Result<SurfaceId>;

    /// Hide and destroy a surface
    fn release_surface(&mut self, id: SurfaceId);
}

/// Shared handle to a host; everything lives on the UI thread
pub type SharedHost = Rc<RefCell<dyn PresentationHost>>;

/// Owns an acquired surface; releases it on drop
pub struct SurfaceGuard {
    host: SharedHost,
    id: SurfaceId,
}

impl std::fmt::Debug for SurfaceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceGuard").field("id", &self.id).finish()
    }
}

impl SurfaceGuard {
    pub fn acquire(host: SharedHost, animated: bool) -> Result<Self> {
        let id = host.borrow_mut().acquire_surface(animated)?;
        tracing::debug!(surface = id.0, animated, "Acquired presentation surface");
        Ok(SurfaceGuard { host, id })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        match self.host.try_borrow_mut() {
            Ok(mut host) => {
                host.release_surface(self.id);
                tracing::debug!(surface = self.id.0, "Released presentation surface");
            }
            Err(_) => tracing::warn!(
                surface = self.id.0,
                "Host busy while releasing presentation surface"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[derive(Default)]
    struct FakeHost {
        next: u64,
        live: Vec<SurfaceId>,
        fail: bool,
    }

    impl PresentationHost for FakeHost {
        fn acquire_surface(&mut self, _animated: bool) -> Result<SurfaceId> {
            if self.fail {
                bail!("no display");
            }
            self.next += 1;
            let id = SurfaceId(self.next);
            self.live.push(id);
            Ok(id)
        }

        fn release_surface(&mut self, id: SurfaceId) {
            self.live.retain(|s| *s != id);
        }
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let guard = SurfaceGuard::acquire(host.clone(), true).unwrap();
        assert_eq!(host.borrow().live, vec![guard.id()]);

        drop(guard);
        assert!(host.borrow().live.is_empty());
    }

    #[test]
    fn test_failed_acquire_leaves_nothing_behind() {
        let host = Rc::new(RefCell::new(FakeHost {
            fail: true,
            ..Default::default()
        }));
        assert!(SurfaceGuard::acquire(host.clone(), false).is_err());
        assert!(host.borrow().live.is_empty());
    }
}
