// Overlay surfaces as layered, topmost Win32 popup windows.
//
// Each surface is one WS_EX_LAYERED popup; alpha goes through SetLayeredWindowAttributes.
// The compositor flags map onto extended styles:
//   • NOT_FOCUSABLE  → WS_EX_NOACTIVATE
//   • NOT_TOUCHABLE  → WS_EX_TRANSPARENT (click-through)
// Layout updates keep the current z-order so the trigger stays above the blinder.

use std::cell::Cell;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{ClientToScreen, CreateSolidBrush};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetSystemMetrics, IsWindow, RegisterClassW,
    SetLayeredWindowAttributes, SetWindowLongW, SetWindowPos, ShowWindow, CS_HREDRAW, CS_VREDRAW,
    GWL_EXSTYLE, HWND_TOPMOST, LWA_ALPHA, SM_CXSCREEN, SM_CYSCREEN, SWP_FRAMECHANGED,
    SWP_NOACTIVATE, SWP_NOZORDER, SWP_SHOWWINDOW, SW_HIDE, WINDOW_EX_STYLE, WM_CAPTURECHANGED,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use super::HostEvent;
use crate::error::CompositorError;
use crate::geometry::Orientation;
use crate::interaction::{Point, PointerAction, PointerEvent};
use crate::overlay::{Compositor, Display, LayoutParams, SurfaceKind, WindowFlags};

const BLINDER_CLASS: &str = "SurfaceBlinderBlinder\0";
const TRIGGER_CLASS: &str = "SurfaceBlinderTrigger\0";

/// Trigger fill and its fixed alpha, so it stays visible over a fully dimmed screen.
const TRIGGER_COLOR: COLORREF = COLORREF(0x00808080);
const TRIGGER_ALPHA: u8 = 0x60;

thread_local! {
    // Set while the trigger holds mouse capture for a press.
    static TRACKING: Cell<bool> = const { Cell::new(false) };
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// 0xRRGGBB to a GDI COLORREF (0x00BBGGRR).
fn colorref(rgb: u32) -> COLORREF {
    COLORREF(((rgb & 0xFF) << 16) | (rgb & 0xFF00) | ((rgb >> 16) & 0xFF))
}

fn ex_style(flags: WindowFlags) -> WINDOW_EX_STYLE {
    let mut ex = WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW;
    if flags.contains(WindowFlags::NOT_FOCUSABLE) {
        ex = ex | WS_EX_NOACTIVATE;
    }
    if flags.contains(WindowFlags::NOT_TOUCHABLE) {
        ex = ex | WS_EX_TRANSPARENT;
    }
    ex
}

fn screen_extent() -> (u32, u32) {
    unsafe {
        (
            GetSystemMetrics(SM_CXSCREEN).max(0) as u32,
            GetSystemMetrics(SM_CYSCREEN).max(0) as u32,
        )
    }
}

/// Absolute window rectangle for a layout block.
fn placement(layout: &LayoutParams) -> (i32, i32, i32, i32) {
    let (_, height) = screen_extent();
    let (x, y) = layout.gravity.origin(&layout.frame(), height);
    (x, y, layout.width, layout.height)
}

fn lparam_point(lparam: LPARAM) -> POINT {
    POINT {
        x: (lparam.0 & 0xFFFF) as u16 as i16 as i32,
        y: ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32,
    }
}

fn queue_pointer(hwnd: HWND, action: PointerAction, lparam: LPARAM) {
    let local = lparam_point(lparam);
    let mut raw = local;
    unsafe {
        let _ = ClientToScreen(hwnd, &mut raw);
    }
    super::push_event(HostEvent::Pointer(PointerEvent::single(
        action,
        Point::new(local.x as f32, local.y as f32),
        Point::new(raw.x as f32, raw.y as f32),
    )));
}

/// Blinder windows only paint their background.
unsafe extern "system" fn blinder_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Trigger input becomes a queued pointer stream; the host loop hands it to the controller.
unsafe extern "system" fn trigger_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_LBUTTONDOWN => {
            TRACKING.with(|t| t.set(true));
            SetCapture(hwnd);
            queue_pointer(hwnd, PointerAction::Down, lparam);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            if TRACKING.with(|t| t.get()) {
                queue_pointer(hwnd, PointerAction::Move, lparam);
            }
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            if TRACKING.with(|t| t.replace(false)) {
                let _ = ReleaseCapture();
                queue_pointer(hwnd, PointerAction::Up, lparam);
            }
            LRESULT(0)
        }
        WM_CAPTURECHANGED => {
            // Capture stolen mid-press.
            if TRACKING.with(|t| t.replace(false)) {
                queue_pointer(hwnd, PointerAction::Cancel, lparam);
            }
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Compositor backed by layered Win32 windows.
pub struct Win32Compositor {
    blinder: Option<HWND>,
    trigger: Option<HWND>,
    blinder_color: u32,
    classes_registered: bool,
}

impl Win32Compositor {
    pub fn new(blinder_color: u32) -> Self {
        Self {
            blinder: None,
            trigger: None,
            blinder_color,
            classes_registered: false,
        }
    }

    fn slot(&mut self, kind: SurfaceKind) -> &mut Option<HWND> {
        match kind {
            SurfaceKind::Blinder => &mut self.blinder,
            SurfaceKind::Trigger => &mut self.trigger,
        }
    }

    fn hwnd(&self, kind: SurfaceKind) -> Option<HWND> {
        match kind {
            SurfaceKind::Blinder => self.blinder,
            SurfaceKind::Trigger => self.trigger,
        }
    }

    fn register_classes(&mut self) -> Result<(), CompositorError> {
        if self.classes_registered {
            return Ok(());
        }

        unsafe {
            let hinstance = GetModuleHandleW(PCWSTR::null())
                .map_err(|e| CompositorError::Platform(e.to_string()))?;

            let blinder_name = wide(BLINDER_CLASS);
            let blinder = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(blinder_proc),
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(blinder_name.as_ptr()),
                hbrBackground: CreateSolidBrush(colorref(self.blinder_color)),
                ..Default::default()
            };

            let trigger_name = wide(TRIGGER_CLASS);
            let trigger = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(trigger_proc),
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(trigger_name.as_ptr()),
                hbrBackground: CreateSolidBrush(TRIGGER_COLOR),
                ..Default::default()
            };

            if RegisterClassW(&blinder) == 0 || RegisterClassW(&trigger) == 0 {
                return Err(CompositorError::Platform(
                    "overlay window class registration failed".into(),
                ));
            }
        }

        self.classes_registered = true;
        Ok(())
    }
}

impl Compositor for Win32Compositor {
    fn add_surface(
        &mut self,
        kind: SurfaceKind,
        layout: &LayoutParams,
    ) -> Result<(), CompositorError> {
        if self.is_attached(kind) {
            return Err(CompositorError::AlreadyAttached(kind));
        }
        self.register_classes()?;

        let (class, initial_alpha) = match kind {
            SurfaceKind::Blinder => (BLINDER_CLASS, 0),
            SurfaceKind::Trigger => (TRIGGER_CLASS, TRIGGER_ALPHA),
        };
        let class_name = wide(class);
        let (x, y, w, h) = placement(layout);

        let hwnd = unsafe {
            let hinstance = GetModuleHandleW(PCWSTR::null())
                .map_err(|e| CompositorError::Platform(e.to_string()))?;
            let hwnd = CreateWindowExW(
                ex_style(layout.flags),
                PCWSTR(class_name.as_ptr()),
                PCWSTR::null(),
                WS_POPUP,
                x,
                y,
                w,
                h,
                None,
                None,
                Some(hinstance.into()),
                None,
            )
            .map_err(|e| CompositorError::Platform(e.to_string()))?;

            let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), initial_alpha, LWA_ALPHA);
            let _ = SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                x,
                y,
                w,
                h,
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            );
            hwnd
        };

        *self.slot(kind) = Some(hwnd);
        Ok(())
    }

    fn update_layout(
        &mut self,
        kind: SurfaceKind,
        layout: &LayoutParams,
    ) -> Result<(), CompositorError> {
        let hwnd = self
            .hwnd(kind)
            .ok_or(CompositorError::NotAttached(kind))?;
        let (x, y, w, h) = placement(layout);

        unsafe {
            SetWindowLongW(hwnd, GWL_EXSTYLE, ex_style(layout.flags).0 as i32);
            SetWindowPos(
                hwnd,
                None,
                x,
                y,
                w,
                h,
                SWP_NOACTIVATE | SWP_NOZORDER | SWP_FRAMECHANGED,
            )
            .map_err(|e| CompositorError::Platform(e.to_string()))
        }
    }

    fn remove_surface(&mut self, kind: SurfaceKind) -> Result<(), CompositorError> {
        let hwnd = self
            .slot(kind)
            .take()
            .ok_or(CompositorError::NotAttached(kind))?;
        unsafe {
            let _ = ShowWindow(hwnd, SW_HIDE);
            DestroyWindow(hwnd).map_err(|e| CompositorError::Platform(e.to_string()))
        }
    }

    fn set_alpha(&mut self, kind: SurfaceKind, alpha: f32) {
        if let Some(hwnd) = self.hwnd(kind) {
            let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
            unsafe {
                let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA);
            }
        }
    }

    fn is_attached(&self, kind: SurfaceKind) -> bool {
        self.hwnd(kind)
            .is_some_and(|hwnd| unsafe { IsWindow(Some(hwnd)).as_bool() })
    }
}

/// Primary display via system metrics.
pub struct Win32Display;

impl Display for Win32Display {
    fn screen_size(&self) -> (u32, u32) {
        screen_extent()
    }

    fn orientation(&self) -> Orientation {
        let (width, height) = screen_extent();
        Orientation::from_extent(width, height)
    }
}
