// Win32 host: single-instance guard, tray-driven preference toggle and the UI event loop.
//
// Window procedures never touch the controller. They queue `HostEvent`s, and the loop
// drains the queue between message pumps, so compositor calls that re-enter a window
// procedure can never observe the controller mid-update.

pub mod overlay;
pub mod tray;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Instant;

use anyhow::{Context, Result};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::{
    CreateMutexW, OpenMutexW, INFINITE, SYNCHRONIZATION_ACCESS_RIGHTS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, MsgWaitForMultipleObjects,
    PeekMessageW, PostQuitMessage, RegisterClassW, TranslateMessage, MSG, PM_REMOVE,
    QS_ALLINPUT, WINDOW_EX_STYLE, WM_COMMAND, WM_DISPLAYCHANGE, WM_LBUTTONUP, WM_QUIT,
    WM_RBUTTONUP, WNDCLASSW, WS_OVERLAPPED,
};

use crate::config::{self, AppConfig};
use crate::controller::OverlayController;
use crate::interaction::PointerEvent;
use overlay::{Win32Compositor, Win32Display};

const SINGLE_INSTANCE_MUTEX: &str = "SurfaceBlinderMutex\0";
const HOST_CLASS: &str = "SurfaceBlinderHost\0";

type Controller = OverlayController<Win32Compositor, Win32Display>;

/// Work handed from window procedures to the loop.
#[derive(Debug)]
pub(crate) enum HostEvent {
    Pointer(PointerEvent),
    DisplayChanged,
    ShowMenu,
    ToggleEnabled,
    Quit,
}

thread_local! {
    static EVENTS: RefCell<VecDeque<HostEvent>> = const { RefCell::new(VecDeque::new()) };
}

pub(crate) fn push_event(event: HostEvent) {
    EVENTS.with(|q| q.borrow_mut().push_back(event));
}

fn pop_event() -> Option<HostEvent> {
    EVENTS.with(|q| q.borrow_mut().pop_front())
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Check if another instance is already running
pub fn is_already_running() -> bool {
    let name = wide(SINGLE_INSTANCE_MUTEX);

    unsafe {
        let existing = OpenMutexW(
            SYNCHRONIZATION_ACCESS_RIGHTS(0x001F0001), // MUTEX_ALL_ACCESS
            false,
            PCWSTR(name.as_ptr()),
        );
        if existing.is_ok() {
            return true;
        }

        // Create the mutex (this instance owns it)
        let _ = CreateMutexW(None, true, PCWSTR(name.as_ptr()));
        false
    }
}

/// Hidden top-level window: receives tray callbacks, menu commands and display changes.
unsafe extern "system" fn host_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        tray::WM_TRAY_ICON => {
            let event = (lparam.0 & 0xFFFF) as u32;
            if event == WM_RBUTTONUP || event == WM_LBUTTONUP {
                push_event(HostEvent::ShowMenu);
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            match (wparam.0 & 0xFFFF) as u32 {
                tray::IDM_TOGGLE => push_event(HostEvent::ToggleEnabled),
                tray::IDM_QUIT => push_event(HostEvent::Quit),
                _ => {}
            }
            LRESULT(0)
        }
        WM_DISPLAYCHANGE => {
            push_event(HostEvent::DisplayChanged);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn create_host_window() -> Result<HWND> {
    let class_name = wide(HOST_CLASS);
    let title = wide("Surface Blinder\0");

    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null()).context("module handle")?;
        let wc = WNDCLASSW {
            lpfnWndProc: Some(host_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            anyhow::bail!("host window class registration failed");
        }

        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
        .context("creating host window")?;
        Ok(hwnd)
    }
}

/// Start and resume the overlay. Only fatal controller errors escape.
fn start_overlay(controller: &mut Controller) -> Result<()> {
    match controller.start() {
        Ok(()) => {
            controller.resume();
            Ok(())
        }
        Err(err) if err.is_fatal() => Err(err).context("starting overlay"),
        Err(_) => Ok(()),
    }
}

fn stop_overlay(controller: &mut Controller) {
    controller.pause();
    // AlreadyStopped is logged by the controller.
    let _ = controller.stop();
}

/// Flip the stored preference and bring the overlay in line with it.
fn toggle_enabled(controller: &mut Controller, cfg: &mut AppConfig) -> Result<()> {
    if controller.is_active() {
        stop_overlay(controller);
    } else {
        start_overlay(controller)?;
    }
    cfg.is_enabled = controller.is_active();
    config::save_config(cfg);
    Ok(())
}

/// Run the blinder until the user quits from the tray.
pub fn run(mut cfg: AppConfig) -> Result<()> {
    if is_already_running() {
        tracing::info!("another instance is running, exiting");
        return Ok(());
    }

    let host = create_host_window()?;
    tray::add_tray_icon(host);

    let mut controller = OverlayController::new(
        Win32Compositor::new(cfg.blinder_color),
        Win32Display,
        Instant::now(),
    );

    let result = if cfg.is_enabled {
        start_overlay(&mut controller)
    } else {
        Ok(())
    }
    .and_then(|()| event_loop(&mut controller, &mut cfg, host));

    if controller.is_active() {
        stop_overlay(&mut controller);
    }
    tray::remove_tray_icon(host);
    unsafe {
        let _ = DestroyWindow(host);
    }
    result
}

fn event_loop(controller: &mut Controller, cfg: &mut AppConfig, host: HWND) -> Result<()> {
    loop {
        let timeout = match controller.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .as_millis()
                .min(u128::from(INFINITE - 1)) as u32,
            None => INFINITE,
        };
        unsafe {
            let _ = MsgWaitForMultipleObjects(None, false, timeout, QS_ALLINPUT);
        }

        let mut msg = MSG::default();
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                return Ok(());
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        while let Some(event) = pop_event() {
            match event {
                HostEvent::Pointer(pointer) => controller.on_pointer_event(pointer, Instant::now()),
                HostEvent::DisplayChanged => {
                    if let Err(err) = controller.on_configuration_changed(Instant::now()) {
                        if err.is_fatal() {
                            return Err(err).context("relayout after display change");
                        }
                        tracing::warn!(error = %err, "relayout after display change failed");
                    }
                }
                HostEvent::ShowMenu => tray::show_context_menu(host, controller.is_active()),
                HostEvent::ToggleEnabled => toggle_enabled(controller, cfg)?,
                HostEvent::Quit => unsafe { PostQuitMessage(0) },
            }
        }

        controller.run_due_tasks(Instant::now());
    }
}
