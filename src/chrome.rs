//! Fullscreen system-UI chrome controller.
//!
//! Keeps the status and navigation bars hidden during playback: visibility
//! changes that reveal the bars arm a one-shot re-hide deadline, and window
//! visibility changes re-apply the flags immediately.

use std::time::{Duration, Instant};

use log::debug;

/// Stable public Android `View` visibility constants.
pub const SYSTEM_UI_FLAG_VISIBLE: i32 = 0x0000_0000;
pub const SYSTEM_UI_FLAG_HIDE_NAVIGATION: i32 = 0x0000_0002;
pub const SYSTEM_UI_FLAG_FULLSCREEN: i32 = 0x0000_0004;
pub const SYSTEM_UI_FLAG_IMMERSIVE: i32 = 0x0000_0800;

/// How long revealed system bars stay up before being hidden again.
pub const REHIDE_DELAY: Duration = Duration::from_millis(3000);

/// Debounced re-hide state for the system UI chrome.
///
/// The deadline lives on the event-loop clock; the owner parks the loop with
/// `WaitUntil` and re-applies the flags when [`FullscreenChrome::fire_due`]
/// reports the deadline elapsed.
pub struct FullscreenChrome {
    rehide_at: Option<Instant>,
}

impl FullscreenChrome {
    pub fn new() -> Self {
        Self { rehide_at: None }
    }

    /// System UI visibility change notification. Arms the re-hide deadline
    /// when the fullscreen bit is clear; a notification with the bit set
    /// neither schedules nor cancels anything.
    pub fn on_system_ui_changed(&mut self, visibility: i32, now: Instant) {
        if visibility & SYSTEM_UI_FLAG_FULLSCREEN == 0 {
            debug!("FullscreenChrome: bars revealed, re-hiding in {:?}", REHIDE_DELAY);
            self.rehide_at = Some(now + REHIDE_DELAY);
        }
    }

    /// The pending re-hide deadline, if any.
    pub fn rehide_deadline(&self) -> Option<Instant> {
        self.rehide_at
    }

    /// True exactly once when a pending deadline has elapsed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.rehide_at {
            Some(deadline) if now >= deadline => {
                self.rehide_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Re-applies the fullscreen/hide-navigation/immersive flags on the decor
/// view. Failure is logged only.
#[cfg(target_os = "android")]
pub fn apply_system_ui(app: &android_activity::AndroidApp) {
    match apply_system_ui_flags(app) {
        Ok(()) => debug!("FullscreenChrome: applied system UI flags"),
        Err(e) => log::error!("FullscreenChrome: failed to apply system UI flags: {e}"),
    }
}

#[cfg(target_os = "android")]
fn apply_system_ui_flags(app: &android_activity::AndroidApp) -> Result<(), jni::errors::Error> {
    use jni::objects::{JObject, JValue};
    use jni::sys::jobject;

    let vm = unsafe { jni::JavaVM::from_raw(app.vm_as_ptr() as *mut jni::sys::JavaVM)? };
    let mut env = vm.attach_current_thread()?;
    let activity = unsafe { JObject::from_raw(app.activity_as_ptr() as jobject) };

    let window = env
        .call_method(&activity, "getWindow", "()Landroid/view/Window;", &[])?
        .l()?;
    let decor_view = env
        .call_method(&window, "getDecorView", "()Landroid/view/View;", &[])?
        .l()?;

    let flags =
        SYSTEM_UI_FLAG_FULLSCREEN | SYSTEM_UI_FLAG_HIDE_NAVIGATION | SYSTEM_UI_FLAG_IMMERSIVE;
    env.call_method(&decor_view, "setSystemUiVisibility", "(I)V", &[JValue::Int(flags)])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_arms_rehide_deadline() {
        let mut chrome = FullscreenChrome::new();
        let now = Instant::now();

        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_VISIBLE, now);

        assert_eq!(chrome.rehide_deadline(), Some(now + REHIDE_DELAY));
    }

    #[test]
    fn fullscreen_bit_set_schedules_nothing() {
        let mut chrome = FullscreenChrome::new();

        chrome.on_system_ui_changed(
            SYSTEM_UI_FLAG_FULLSCREEN | SYSTEM_UI_FLAG_HIDE_NAVIGATION,
            Instant::now(),
        );

        assert!(chrome.rehide_deadline().is_none());
    }

    #[test]
    fn fullscreen_notification_keeps_pending_deadline() {
        let mut chrome = FullscreenChrome::new();
        let now = Instant::now();
        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_VISIBLE, now);

        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_FULLSCREEN, now + Duration::from_secs(1));

        assert_eq!(chrome.rehide_deadline(), Some(now + REHIDE_DELAY));
    }

    #[test]
    fn rearming_replaces_the_deadline() {
        let mut chrome = FullscreenChrome::new();
        let now = Instant::now();
        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_VISIBLE, now);

        let later = now + Duration::from_secs(2);
        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_VISIBLE, later);

        assert_eq!(chrome.rehide_deadline(), Some(later + REHIDE_DELAY));
    }

    #[test]
    fn fire_due_is_edge_triggered() {
        let mut chrome = FullscreenChrome::new();
        let now = Instant::now();
        chrome.on_system_ui_changed(SYSTEM_UI_FLAG_VISIBLE, now);

        assert!(!chrome.fire_due(now + REHIDE_DELAY - Duration::from_millis(1)));
        assert!(chrome.fire_due(now + REHIDE_DELAY));
        assert!(!chrome.fire_due(now + REHIDE_DELAY));
        assert!(chrome.rehide_deadline().is_none());
    }

    #[test]
    fn fire_due_without_deadline_is_false() {
        let mut chrome = FullscreenChrome::new();
        assert!(!chrome.fire_due(Instant::now()));
    }
}
