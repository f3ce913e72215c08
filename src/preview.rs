//! Materialized preview handle lifecycle.
//!
//! Each pipeline run yields a fresh document that the host turns into a
//! loadable resource (a blob URL in the browser host). Those handles are
//! not garbage collected by the host, so the slot owns at most one live
//! handle and revokes the superseded one on every install. This bounds
//! resource growth across repeated generate cycles.

/// Host-side materialization of a composed document.
///
/// The host decides what a handle is (blob URL, temp file, cache key);
/// the slot only guarantees the revoke-on-replace discipline.
pub trait BundleHost {
    type Handle;

    /// Turn a composed document into a loadable resource.
    fn materialize(&self, document: &str) -> Self::Handle;

    /// Release a resource that is no longer the current preview.
    fn revoke(&self, handle: Self::Handle);
}

/// Owns the single live preview handle for one render surface.
pub struct PreviewSlot<H: BundleHost> {
    host: H,
    current: Option<H::Handle>,
}

impl<H: BundleHost> PreviewSlot<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            current: None,
        }
    }

    /// Materialize `document` and make it the current preview, revoking
    /// the handle it supersedes.
    pub fn install(&mut self, document: &str) -> &H::Handle {
        let next = self.host.materialize(document);
        if let Some(previous) = self.current.replace(next) {
            self.host.revoke(previous);
        }
        self.current.as_ref().expect("handle installed above")
    }

    pub fn current(&self) -> Option<&H::Handle> {
        self.current.as_ref()
    }

    /// Drop the current preview without installing a replacement.
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            self.host.revoke(previous);
        }
    }
}

impl<H: BundleHost> Drop for PreviewSlot<H> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Test host that hands out sequential ids and records revocations.
    #[derive(Clone, Default)]
    struct RecordingHost {
        next_id: Rc<RefCell<u32>>,
        revoked: Rc<RefCell<Vec<u32>>>,
    }

    impl BundleHost for RecordingHost {
        type Handle = u32;

        fn materialize(&self, _document: &str) -> u32 {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            *next
        }

        fn revoke(&self, handle: u32) {
            self.revoked.borrow_mut().push(handle);
        }
    }

    #[test]
    fn test_install_revokes_superseded_handle() {
        let host = RecordingHost::default();
        let revoked = host.revoked.clone();
        let mut slot = PreviewSlot::new(host);

        assert_eq!(*slot.install("<html>1</html>"), 1);
        assert!(revoked.borrow().is_empty());

        assert_eq!(*slot.install("<html>2</html>"), 2);
        assert_eq!(*revoked.borrow(), vec![1]);

        slot.install("<html>3</html>");
        assert_eq!(*revoked.borrow(), vec![1, 2]);
        assert_eq!(slot.current(), Some(&3));
    }

    #[test]
    fn test_drop_revokes_last_handle() {
        let host = RecordingHost::default();
        let revoked = host.revoked.clone();
        {
            let mut slot = PreviewSlot::new(host);
            slot.install("<html></html>");
        }
        assert_eq!(*revoked.borrow(), vec![1]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let host = RecordingHost::default();
        let revoked = host.revoked.clone();
        let mut slot = PreviewSlot::new(host);
        slot.install("<html></html>");
        slot.clear();
        slot.clear();
        assert_eq!(*revoked.borrow(), vec![1]);
        assert!(slot.current().is_none());
    }
}
