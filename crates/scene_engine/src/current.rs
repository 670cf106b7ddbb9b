//! Current scene designation
//!
//! The engine updates and renders whichever scene was last made current on
//! the traversal thread. The designation is a weak pointer: it never keeps a
//! scene alive, and reads `None` once the scene is dropped.

use crate::scene::Scene;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Scene shared between the application and the engine loop
pub type SharedScene = Rc<RefCell<Scene>>;

thread_local! {
    static CURRENT: RefCell<Weak<RefCell<Scene>>> = RefCell::new(Weak::new());
}

impl Scene {
    /// Wrap the scene for sharing with the engine loop
    pub fn into_shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }
}

/// Designate `scene` as the current scene of this thread; last writer wins
pub fn make_current(scene: &SharedScene) {
    CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(scene));
    log::debug!("Current scene changed");
}

/// The current scene of this thread, if one is designated and still alive
pub fn current() -> Option<SharedScene> {
    CURRENT.with(|current| current.borrow().upgrade())
}

/// Clear the designation
pub fn clear_current() {
    CURRENT.with(|current| *current.borrow_mut() = Weak::new());
}

/// Whether `scene` is the current scene of this thread
pub fn is_current(scene: &SharedScene) -> bool {
    CURRENT.with(|current| Weak::ptr_eq(&current.borrow(), &Rc::downgrade(scene)))
}
