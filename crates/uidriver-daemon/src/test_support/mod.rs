//! Test doubles for the device seam.
//!
//! `DeviceState` is shared between the test and every backend the factory
//! hands out, so a test can reshape the fake UI tree while sessions hold
//! their backends.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use uidriver_core::Point;
use uidriver_core::Rect;
use uidriver_core::Selector;

use crate::device::BackendFactory;
use crate::device::DeviceError;
use crate::device::UiBackend;

/// A gesture as observed by the fake device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Tap(Point),
    DoubleTap(Point),
    LongTap(Point, Duration),
    TouchDown(Point),
    TouchUp(Point),
    TouchMove(Point),
    Drag(Point, Point, u32),
}

/// Shared fake-device state: the visible elements, the gestures performed,
/// and an optional injected failure for the next action.
#[derive(Debug, Default)]
pub struct DeviceState {
    elements: Mutex<Vec<(Selector, Rect)>>,
    gestures: Mutex<Vec<Gesture>>,
    fail_next: Mutex<Option<DeviceError>>,
}

impl DeviceState {
    pub fn add_element(&self, selector: Selector, bounds: Rect) {
        self.elements.lock().unwrap().push((selector, bounds));
    }

    pub fn remove_element(&self, selector: &Selector) {
        self.elements.lock().unwrap().retain(|(s, _)| s != selector);
    }

    pub fn gestures(&self) -> Vec<Gesture> {
        self.gestures.lock().unwrap().clone()
    }

    /// Make the next backend action fail with `err`.
    pub fn fail_next_with(&self, err: DeviceError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn take_failure(&self) -> Option<DeviceError> {
        self.fail_next.lock().unwrap().take()
    }

    fn lookup(&self, selector: &Selector) -> Option<Rect> {
        self.elements
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, bounds)| *bounds)
    }

    fn record(&self, gesture: Gesture) -> Result<(), DeviceError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.gestures.lock().unwrap().push(gesture);
        Ok(())
    }
}

/// Backend answering from a shared [`DeviceState`].
pub struct ScriptedBackend {
    state: Arc<DeviceState>,
}

impl ScriptedBackend {
    pub fn new(state: Arc<DeviceState>) -> Self {
        Self { state }
    }
}

impl UiBackend for ScriptedBackend {
    fn tap(&mut self, point: Point) -> Result<(), DeviceError> {
        self.state.record(Gesture::Tap(point))
    }

    fn double_tap(&mut self, point: Point) -> Result<(), DeviceError> {
        self.state.record(Gesture::DoubleTap(point))
    }

    fn long_tap(&mut self, point: Point, duration: Duration) -> Result<(), DeviceError> {
        self.state.record(Gesture::LongTap(point, duration))
    }

    fn touch_down(&mut self, point: Point) -> Result<(), DeviceError> {
        self.state.record(Gesture::TouchDown(point))
    }

    fn touch_up(&mut self, point: Point) -> Result<(), DeviceError> {
        self.state.record(Gesture::TouchUp(point))
    }

    fn touch_move(&mut self, point: Point) -> Result<(), DeviceError> {
        self.state.record(Gesture::TouchMove(point))
    }

    fn drag(&mut self, from: Point, to: Point, steps: u32) -> Result<(), DeviceError> {
        self.state.record(Gesture::Drag(from, to, steps))
    }

    fn find_element(&mut self, selector: &Selector) -> Result<Option<Rect>, DeviceError> {
        if let Some(err) = self.state.take_failure() {
            return Err(err);
        }
        Ok(self.state.lookup(selector))
    }

    fn element_bounds(&mut self, selector: &Selector) -> Result<Rect, DeviceError> {
        if let Some(err) = self.state.take_failure() {
            return Err(err);
        }
        self.state.lookup(selector).ok_or(DeviceError::Stale)
    }
}

/// Factory handing every session a backend over the same shared state.
pub fn scripted_factory(state: Arc<DeviceState>) -> BackendFactory {
    Box::new(move || Ok(Box::new(ScriptedBackend::new(Arc::clone(&state)))))
}
