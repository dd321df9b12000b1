use std::collections::BTreeSet;

use chrono::Utc;
use gloo::console::log;
use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use gloo::timers::future::TimeoutFuture;
use taskdeck_shared::due::is_overdue;
use taskdeck_shared::filters::{
    search_ready, DebounceSeq, StatusFilter, TaskQuery, SEARCH_DEBOUNCE_MS,
};
use taskdeck_shared::validate::{validate_profile, validate_registration, RegisterErrors};
use taskdeck_shared::{
    reorder, selection, ActivityEntry, BulkAction, BulkActionPayload, CategoryDto,
    CategoryPayload, LoginPayload, ProfileUpdate, RegisterPayload, ReorderPayload, SharePayload,
    StatsOverview, TaskDto, UserDto,
};
use uuid::Uuid;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::{
    classes, function_component, html, use_effect_with, use_mut_ref, use_state, Callback, Html,
    TargetCast,
};

use crate::api;
use crate::auth::{AuthPanel, ProfileModal};
use crate::charts::{CategoryChart, ProductivityChart};
use crate::components::{
    ActivityFeed, BulkBar, CategorySidebar, FilterTabs, ShareModal, StatsPanel, TaskForm,
    TaskFormState, TaskList,
};
use crate::sync::{self, RealtimeEvent};
use crate::ui::{
    Accordion, AccordionItem, ConfirmDialog, Modal, Pagination, SkeletonList, Toast, ToastKind,
    ToastState, TOAST_DURATION_MS,
};

const THEME_STORAGE_KEY: &str = "taskdeck.theme";
const ACTIVITY_WINDOW_DAYS: u32 = 7;
const TASKS_PER_PAGE: usize = 20;
const SHAKE_DURATION_MS: u32 = 500;
const PERIODIC_REFRESH_MS: u32 = 5 * 60 * 1_000;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    fn as_class(self) -> &'static str {
        match self {
            Self::Light => "theme-light",
            Self::Dark => "theme-dark",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn storage_value(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark",
            Self::Dark => "Light",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Pending confirmation; the dialog resolves it with confirm or cancel.
#[derive(Clone, PartialEq)]
struct ConfirmState {
    message: String,
    request: ConfirmRequest,
}

#[derive(Clone, PartialEq)]
enum ConfirmRequest {
    DeleteTask(Uuid),
    BulkDelete(Vec<Uuid>),
}

#[function_component(App)]
pub fn app() -> Html {
    let theme = use_state(load_theme_mode);
    let session = use_state(|| None::<UserDto>);
    let session_checked = use_state(|| false);
    let login_error = use_state(|| None::<String>);
    let register_errors = use_state(RegisterErrors::default);
    let auth_shake = use_state(|| false);

    let tasks = use_state(Vec::<TaskDto>::new);
    let tasks_loaded = use_state(|| false);
    let categories = use_state(Vec::<CategoryDto>::new);
    let activity = use_state(Vec::<ActivityEntry>::new);
    let stats = use_state(StatsOverview::default);

    let category_filter = use_state(|| None::<Uuid>);
    let status_filter = use_state(StatusFilter::default);
    let search_text = use_state(String::new);
    let page = use_state(|| 1_usize);

    let bulk_mode = use_state(|| false);
    let selected = use_state(BTreeSet::<Uuid>::new);

    let form = use_state(TaskFormState::default);
    let toast = use_state(|| None::<ToastState>);
    let confirm = use_state(|| None::<ConfirmState>);
    let share_task = use_state(|| None::<Uuid>);
    let profile_open = use_state(|| false);
    let category_modal_open = use_state(|| false);
    let category_name = use_state(String::new);
    let category_color = use_state(|| "#6366f1".to_string());
    let category_icon = use_state(|| "📁".to_string());

    let dragging = use_state(|| None::<Uuid>);
    let drag_over = use_state(|| None::<Uuid>);
    let refresh_tick = use_state(|| 0_u64);

    let search_seq = use_mut_ref(DebounceSeq::default);
    let toast_seq = use_mut_ref(|| 0_u64);

    let show_toast = {
        let toast = toast.clone();
        let toast_seq = toast_seq.clone();
        Callback::from(move |(kind, message): (ToastKind, String)| {
            let ticket = {
                let mut seq = toast_seq.borrow_mut();
                *seq = seq.wrapping_add(1);
                *seq
            };
            let state = ToastState {
                kind,
                message,
                duration_ms: TOAST_DURATION_MS,
            };
            let duration_ms = state.duration_ms;
            toast.set(Some(state));

            // Zero disables auto-dismiss; a newer toast keeps its own timer.
            if duration_ms > 0 {
                let toast = toast.clone();
                let toast_seq = toast_seq.clone();
                spawn_local(async move {
                    TimeoutFuture::new(duration_ms).await;
                    if *toast_seq.borrow() == ticket {
                        toast.set(None);
                    }
                });
            }
        })
    };

    let trigger_shake = {
        let auth_shake = auth_shake.clone();
        Callback::from(move |_: ()| {
            auth_shake.set(true);
            let auth_shake = auth_shake.clone();
            spawn_local(async move {
                TimeoutFuture::new(SHAKE_DURATION_MS).await;
                auth_shake.set(false);
            });
        })
    };

    // Startup: fetch the anti-forgery token, then probe the session.
    {
        let session = session.clone();
        let session_checked = session_checked.clone();
        let theme = theme.clone();
        use_effect_with((), move |_| {
            ui_debug("app.mounted", "frontend mounted and hooks initialized");
            spawn_local(async move {
                if let Err(error) = api::auth::init_csrf().await {
                    tracing::error!(error = %error, "failed to fetch anti-forgery token");
                }

                let user = api::auth::check_session().await;
                if stored_theme().is_none()
                    && let Some(preference) = user
                        .as_ref()
                        .and_then(|user| ThemeMode::from_key(&user.theme_preference))
                {
                    theme.set(preference);
                }
                session.set(user);
                session_checked.set(true);
            });
            || ()
        });
    }

    // The task list is a projection of the last successful fetch for the
    // current filters; any change to them (or an explicit refresh) reloads.
    {
        let tasks = tasks.clone();
        let tasks_loaded = tasks_loaded.clone();
        let selected = selected.clone();
        let show_toast = show_toast.clone();
        let query = TaskQuery {
            category: *category_filter,
            status: *status_filter,
            search: None,
        };
        use_effect_with(
            ((*session).is_some(), query, *refresh_tick),
            move |(authed, query, tick)| {
                if *authed {
                    tracing::info!(
                        tick,
                        status = %query.status.as_key(),
                        category = ?query.category,
                        "refreshing task list"
                    );
                    let query = query.clone();
                    spawn_local(async move {
                        match api::todos::list(&query).await {
                            Ok(list) => {
                                let mut keep = (*selected).clone();
                                selection::retain_present(&mut keep, &list);
                                selected.set(keep);
                                tasks.set(list);
                                tasks_loaded.set(true);
                            }
                            Err(error) => {
                                tracing::error!(error = %error, "task list load failed");
                                show_toast
                                    .emit((ToastKind::Error, "Failed to load tasks".to_string()));
                            }
                        }
                    });
                }
                || ()
            },
        );
    }

    // Categories, stats and the activity feed load together, concurrently.
    {
        let categories = categories.clone();
        let stats = stats.clone();
        let activity = activity.clone();
        use_effect_with(
            ((*session).is_some(), *refresh_tick),
            move |(authed, _)| {
                if *authed {
                    spawn_local(async move {
                        let (categories_res, stats_res, activity_res) = futures_util::join!(
                            api::categories::list(),
                            api::stats::overview(),
                            api::stats::activity(ACTIVITY_WINDOW_DAYS),
                        );

                        match categories_res {
                            Ok(list) => categories.set(list),
                            Err(error) => {
                                tracing::error!(error = %error, "category load failed");
                            }
                        }
                        match stats_res {
                            Ok(overview) => stats.set(overview),
                            Err(error) => tracing::error!(error = %error, "stats load failed"),
                        }
                        match activity_res {
                            Ok(entries) => activity.set(entries),
                            Err(error) => {
                                tracing::error!(error = %error, "activity load failed");
                            }
                        }
                    });
                }
                || ()
            },
        );
    }

    // Filter changes land back on page one.
    {
        let page = page.clone();
        use_effect_with((*category_filter, *status_filter), move |_| {
            page.set(1);
            || ()
        });
    }

    // Background refresh while signed in.
    {
        let refresh_tick = refresh_tick.clone();
        use_effect_with((*session).is_some(), move |authed| {
            let interval = authed.then(|| {
                Interval::new(PERIODIC_REFRESH_MS, move || {
                    tracing::debug!("periodic refresh");
                    refresh_tick.set((*refresh_tick).saturating_add(1));
                })
            });
            move || drop(interval)
        });
    }

    // Connection banners.
    {
        let show_toast = show_toast.clone();
        let refresh_tick = refresh_tick.clone();
        use_effect_with((), move |_| {
            let listeners = web_sys::window().map(|window| {
                let on_online = {
                    let show_toast = show_toast.clone();
                    let refresh_tick = refresh_tick.clone();
                    EventListener::new(&window, "online", move |_| {
                        show_toast
                            .emit((ToastKind::Success, "Connection restored".to_string()));
                        refresh_tick.set((*refresh_tick).saturating_add(1));
                    })
                };
                let on_offline = EventListener::new(&window, "offline", move |_| {
                    show_toast.emit((
                        ToastKind::Warning,
                        "You are offline. Some features may not work.".to_string(),
                    ));
                });
                (on_online, on_offline)
            });
            move || drop(listeners)
        });
    }

    // Realtime channel, present but dormant by default.
    {
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        let user_id = (*session).as_ref().map(|user| user.id);
        use_effect_with(user_id, move |user_id| {
            if sync::REALTIME_ENABLED && let Some(user_id) = *user_id {
                let on_event = Callback::from(move |event: RealtimeEvent| {
                    match &event {
                        RealtimeEvent::TaskCreated(payload) if payload.user_id != user_id => {
                            show_toast.emit((
                                ToastKind::Info,
                                format!("New task created: {}", payload.title),
                            ));
                        }
                        RealtimeEvent::TaskShared(payload)
                            if payload.shared_with.contains(&user_id) =>
                        {
                            show_toast.emit((
                                ToastKind::Info,
                                format!("A task was shared with you: {}", payload.title),
                            ));
                        }
                        _ => {}
                    }
                    refresh_tick.set((*refresh_tick).saturating_add(1));
                });
                sync::connect(user_id, on_event);
            }
            || ()
        });
    }

    let on_login = {
        let session = session.clone();
        let login_error = login_error.clone();
        let show_toast = show_toast.clone();
        let trigger_shake = trigger_shake.clone();
        Callback::from(move |payload: LoginPayload| {
            login_error.set(None);
            let session = session.clone();
            let login_error = login_error.clone();
            let show_toast = show_toast.clone();
            let trigger_shake = trigger_shake.clone();
            spawn_local(async move {
                match api::auth::login(&payload).await {
                    Ok(response) => {
                        session.set(Some(response.user));
                        show_toast.emit((ToastKind::Success, "Login successful!".to_string()));
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "login failed");
                        let message = if error.is_unauthorized() {
                            "Invalid username or password".to_string()
                        } else {
                            error
                                .body()
                                .map(|body| body.summary().to_string())
                                .unwrap_or_else(|| "Login failed. Please try again.".to_string())
                        };
                        login_error.set(Some(message));
                        trigger_shake.emit(());
                    }
                }
            });
        })
    };

    let on_register = {
        let session = session.clone();
        let register_errors = register_errors.clone();
        let show_toast = show_toast.clone();
        let trigger_shake = trigger_shake.clone();
        Callback::from(move |payload: RegisterPayload| {
            let errors = validate_registration(&payload);
            if !errors.is_empty() {
                register_errors.set(errors);
                trigger_shake.emit(());
                return;
            }
            register_errors.set(RegisterErrors::default());

            let session = session.clone();
            let register_errors = register_errors.clone();
            let show_toast = show_toast.clone();
            let trigger_shake = trigger_shake.clone();
            spawn_local(async move {
                match api::auth::register(&payload).await {
                    Ok(response) => {
                        session.set(Some(response.user));
                        show_toast.emit((
                            ToastKind::Success,
                            "Registration successful! Welcome to taskdeck!".to_string(),
                        ));
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "registration failed");
                        let mut errors = RegisterErrors::default();
                        match error.body() {
                            Some(body) => errors.apply_server_errors(body),
                            None => {
                                errors.non_field =
                                    Some("Registration failed. Please try again.".to_string());
                            }
                        }
                        register_errors.set(errors);
                        trigger_shake.emit(());
                    }
                }
            });
        })
    };

    let on_logout = {
        let session = session.clone();
        let tasks = tasks.clone();
        let tasks_loaded = tasks_loaded.clone();
        let categories = categories.clone();
        let activity = activity.clone();
        let stats = stats.clone();
        let selected = selected.clone();
        let bulk_mode = bulk_mode.clone();
        let form = form.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let session = session.clone();
            let tasks = tasks.clone();
            let tasks_loaded = tasks_loaded.clone();
            let categories = categories.clone();
            let activity = activity.clone();
            let stats = stats.clone();
            let selected = selected.clone();
            let bulk_mode = bulk_mode.clone();
            let form = form.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::auth::logout().await {
                    Ok(()) => {
                        session.set(None);
                        tasks.set(Vec::new());
                        tasks_loaded.set(false);
                        categories.set(Vec::new());
                        activity.set(Vec::new());
                        stats.set(StatsOverview::default());
                        selected.set(BTreeSet::new());
                        bulk_mode.set(false);
                        form.set(TaskFormState::default());
                        show_toast
                            .emit((ToastKind::Success, "Logged out successfully".to_string()));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "logout failed");
                        show_toast.emit((
                            ToastKind::Error,
                            "Logout failed. Please try again.".to_string(),
                        ));
                    }
                }
            });
        })
    };

    let on_profile_save = {
        let session = session.clone();
        let profile_open = profile_open.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |update: ProfileUpdate| {
            if let Some(message) = validate_profile(&update) {
                show_toast.emit((ToastKind::Error, message));
                return;
            }
            let session = session.clone();
            let profile_open = profile_open.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::auth::update_profile(&update).await {
                    Ok(response) => {
                        session.set(Some(response.user));
                        profile_open.set(false);
                        show_toast.emit((
                            ToastKind::Success,
                            "Profile updated successfully!".to_string(),
                        ));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "profile update failed");
                        show_toast
                            .emit((ToastKind::Error, "Failed to update profile".to_string()));
                    }
                }
            });
        })
    };

    let on_toggle_theme = {
        let theme = theme.clone();
        let session = session.clone();
        Callback::from(move |_| {
            let next = (*theme).next();
            save_theme_mode(next);
            theme.set(next);

            // Signed-in users also get the preference persisted server-side.
            if (*session).is_some() {
                let update = ProfileUpdate {
                    theme_preference: Some(next.storage_value().to_string()),
                    ..ProfileUpdate::default()
                };
                spawn_local(async move {
                    if let Err(error) = api::auth::update_profile(&update).await {
                        tracing::debug!(error = %error, "theme preference push failed");
                    }
                });
            }
        })
    };

    let on_search_input = {
        let search_text = search_text.clone();
        let search_seq = search_seq.clone();
        let tasks = tasks.clone();
        let refresh_tick = refresh_tick.clone();
        let category_filter = category_filter.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let value = input.value();
            search_text.set(value.clone());

            // Every keystroke invalidates any pending search.
            let ticket = search_seq.borrow_mut().arm();

            if value.trim().is_empty() {
                refresh_tick.set((*refresh_tick).saturating_add(1));
                return;
            }
            if !search_ready(&value) {
                return;
            }

            let search_seq = search_seq.clone();
            let tasks = tasks.clone();
            let category = *category_filter;
            spawn_local(async move {
                TimeoutFuture::new(SEARCH_DEBOUNCE_MS).await;
                if !search_seq.borrow().is_current(ticket) {
                    return;
                }

                let query = TaskQuery {
                    category,
                    status: StatusFilter::All,
                    search: Some(value.trim().to_string()),
                };
                match api::todos::list(&query).await {
                    Ok(list) => tasks.set(list),
                    Err(error) => tracing::error!(error = %error, "task search failed"),
                }
            });
        })
    };

    let on_select_category = {
        let category_filter = category_filter.clone();
        let selected = selected.clone();
        Callback::from(move |category: Option<Uuid>| {
            category_filter.set(category);
            selected.set(BTreeSet::new());
        })
    };

    let on_select_status = {
        let status_filter = status_filter.clone();
        let selected = selected.clone();
        Callback::from(move |status: StatusFilter| {
            status_filter.set(status);
            selected.set(BTreeSet::new());
        })
    };

    let on_page = {
        let page = page.clone();
        Callback::from(move |target: usize| page.set(target))
    };

    let on_toggle_complete = {
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |id: Uuid| {
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::todos::toggle(id).await {
                    Ok(_) => refresh_tick.set((*refresh_tick).saturating_add(1)),
                    Err(error) => {
                        tracing::error!(error = %error, task = %id, "toggle failed");
                        show_toast.emit((ToastKind::Error, "Failed to update task".to_string()));
                    }
                }
            });
        })
    };

    let on_edit = {
        let tasks = tasks.clone();
        let form = form.clone();
        Callback::from(move |id: Uuid| {
            if let Some(task) = tasks.iter().find(|task| task.id == id) {
                form.set(TaskFormState::from_task(task));
                ui_debug("action.edit", "task loaded into the form");
            }
        })
    };

    let on_delete = {
        let confirm = confirm.clone();
        Callback::from(move |id: Uuid| {
            confirm.set(Some(ConfirmState {
                message: "Are you sure you want to delete this task?".to_string(),
                request: ConfirmRequest::DeleteTask(id),
            }));
        })
    };

    let on_toggle_bulk_mode = {
        let bulk_mode = bulk_mode.clone();
        let selected = selected.clone();
        Callback::from(move |_| {
            // Entering or leaving bulk mode always drops the selection.
            bulk_mode.set(!*bulk_mode);
            selected.set(BTreeSet::new());
        })
    };

    let on_toggle_select = {
        let selected = selected.clone();
        Callback::from(move |id: Uuid| {
            let mut next = (*selected).clone();
            selection::toggle(&mut next, id);
            selected.set(next);
        })
    };

    let run_bulk = {
        let selected = selected.clone();
        let bulk_mode = bulk_mode.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |action: BulkAction| {
            let Some(ids) = selection::bulk_ids(&selected) else {
                show_toast.emit((ToastKind::Warning, "No tasks selected".to_string()));
                return;
            };

            let selected = selected.clone();
            let bulk_mode = bulk_mode.clone();
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                let count = ids.len();
                let payload = BulkActionPayload {
                    action,
                    todo_ids: ids,
                };
                match api::todos::bulk_action(&payload).await {
                    Ok(()) => {
                        show_toast.emit((
                            ToastKind::Success,
                            format!("{count} tasks {}", action.done_label()),
                        ));
                        selected.set(BTreeSet::new());
                        bulk_mode.set(false);
                        refresh_tick.set((*refresh_tick).saturating_add(1));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, ?action, "bulk action failed");
                        show_toast.emit((ToastKind::Error, "Bulk action failed".to_string()));
                    }
                }
            });
        })
    };

    let on_bulk_complete = {
        let run_bulk = run_bulk.clone();
        Callback::from(move |_| run_bulk.emit(BulkAction::Complete))
    };
    let on_bulk_archive = {
        let run_bulk = run_bulk.clone();
        Callback::from(move |_| run_bulk.emit(BulkAction::Archive))
    };
    let on_bulk_delete = {
        let selected = selected.clone();
        let confirm = confirm.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let Some(ids) = selection::bulk_ids(&selected) else {
                show_toast.emit((ToastKind::Warning, "No tasks selected".to_string()));
                return;
            };
            confirm.set(Some(ConfirmState {
                message: format!("Are you sure you want to delete {} tasks?", ids.len()),
                request: ConfirmRequest::BulkDelete(ids),
            }));
        })
    };

    let on_confirm = {
        let confirm = confirm.clone();
        let selected = selected.clone();
        let bulk_mode = bulk_mode.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let Some(state) = (*confirm).clone() else {
                return;
            };
            confirm.set(None);

            let selected = selected.clone();
            let bulk_mode = bulk_mode.clone();
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match state.request {
                    ConfirmRequest::DeleteTask(id) => match api::todos::remove(id).await {
                        Ok(()) => {
                            show_toast.emit((
                                ToastKind::Success,
                                "Task deleted successfully!".to_string(),
                            ));
                            refresh_tick.set((*refresh_tick).saturating_add(1));
                        }
                        Err(error) => {
                            tracing::error!(error = %error, task = %id, "delete failed");
                            show_toast
                                .emit((ToastKind::Error, "Failed to delete task".to_string()));
                        }
                    },
                    ConfirmRequest::BulkDelete(ids) => {
                        let count = ids.len();
                        let payload = BulkActionPayload {
                            action: BulkAction::Delete,
                            todo_ids: ids,
                        };
                        match api::todos::bulk_action(&payload).await {
                            Ok(()) => {
                                show_toast
                                    .emit((ToastKind::Success, format!("{count} tasks deleted")));
                                selected.set(BTreeSet::new());
                                bulk_mode.set(false);
                                refresh_tick.set((*refresh_tick).saturating_add(1));
                            }
                            Err(error) => {
                                tracing::error!(error = %error, "bulk delete failed");
                                show_toast.emit((
                                    ToastKind::Error,
                                    "Failed to delete tasks".to_string(),
                                ));
                            }
                        }
                    }
                }
            });
        })
    };

    let on_cancel_confirm = {
        let confirm = confirm.clone();
        Callback::from(move |_| confirm.set(None))
    };

    let on_drag_start = {
        let dragging = dragging.clone();
        Callback::from(move |id: Uuid| {
            tracing::debug!(task = %id, "drag start");
            dragging.set(Some(id));
        })
    };
    let on_drag_over = {
        let drag_over = drag_over.clone();
        Callback::from(move |id: Uuid| {
            if *drag_over != Some(id) {
                drag_over.set(Some(id));
            }
        })
    };
    let on_drag_end = {
        let dragging = dragging.clone();
        let drag_over = drag_over.clone();
        Callback::from(move |_| {
            dragging.set(None);
            drag_over.set(None);
        })
    };

    let on_drop = {
        let tasks = tasks.clone();
        let dragging = dragging.clone();
        let drag_over = drag_over.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |(dragged, target): (Uuid, Uuid)| {
            dragging.set(None);
            drag_over.set(None);

            let mut next = (*tasks).clone();
            if !reorder::move_task(&mut next, dragged, target) {
                return;
            }
            reorder::renumber(&mut next);
            let payload = ReorderPayload {
                positions: reorder::position_map(&next),
            };

            // Optimistic local order; a failed persist reloads from the
            // backend instead of retrying.
            tasks.set(next);

            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                if let Err(error) = api::todos::reorder(&payload).await {
                    tracing::error!(error = %error, "reorder failed; reloading");
                    show_toast.emit((ToastKind::Error, "Failed to reorder tasks".to_string()));
                    refresh_tick.set((*refresh_tick).saturating_add(1));
                }
            });
        })
    };

    let on_form_change = {
        let form = form.clone();
        Callback::from(move |next: TaskFormState| form.set(next))
    };

    let on_form_submit = {
        let form = form.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let state = (*form).clone();
            let payload = match state.to_payload() {
                Ok(payload) => payload,
                Err(message) => {
                    form.set(TaskFormState {
                        error: Some(message),
                        ..state
                    });
                    return;
                }
            };

            let form = form.clone();
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                let result = match state.editing {
                    Some(id) => api::todos::update(id, &payload).await,
                    None => api::todos::create(&payload).await,
                };
                match result {
                    Ok(_) => {
                        let message = if state.editing.is_some() {
                            "Task updated successfully!"
                        } else {
                            "Task created successfully!"
                        };
                        show_toast.emit((ToastKind::Success, message.to_string()));
                        form.set(TaskFormState::default());
                        refresh_tick.set((*refresh_tick).saturating_add(1));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "task save failed");
                        show_toast.emit((ToastKind::Error, "Failed to save task".to_string()));
                        form.set(TaskFormState {
                            error: Some(error.to_string()),
                            ..state
                        });
                    }
                }
            });
        })
    };

    let on_cancel_edit = {
        let form = form.clone();
        Callback::from(move |_| form.set(TaskFormState::default()))
    };

    let on_share_open = {
        let share_task = share_task.clone();
        Callback::from(move |id: Uuid| share_task.set(Some(id)))
    };
    let on_share_close = {
        let share_task = share_task.clone();
        Callback::from(move |_| share_task.set(None))
    };
    let on_share_search = Callback::from(
        move |(query, reply): (String, Callback<Vec<UserDto>>)| {
            spawn_local(async move {
                match api::users::search(&query).await {
                    Ok(users) => reply.emit(users),
                    Err(error) => tracing::error!(error = %error, "user search failed"),
                }
            });
        },
    );
    let on_share_submit = {
        let share_task = share_task.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |user_ids: Vec<u64>| {
            let Some(task_id) = *share_task else {
                return;
            };
            if user_ids.is_empty() {
                show_toast.emit((
                    ToastKind::Warning,
                    "Please select at least one user to share with".to_string(),
                ));
                return;
            }

            let share_task = share_task.clone();
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::todos::share(task_id, &SharePayload { user_ids }).await {
                    Ok(()) => {
                        share_task.set(None);
                        show_toast
                            .emit((ToastKind::Success, "Task shared successfully!".to_string()));
                        refresh_tick.set((*refresh_tick).saturating_add(1));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, task = %task_id, "share failed");
                        show_toast.emit((ToastKind::Error, "Failed to share task".to_string()));
                    }
                }
            });
        })
    };

    let on_open_category_modal = {
        let category_modal_open = category_modal_open.clone();
        Callback::from(move |_| category_modal_open.set(true))
    };
    let on_close_category_modal = {
        let category_modal_open = category_modal_open.clone();
        let category_name = category_name.clone();
        let category_icon = category_icon.clone();
        Callback::from(move |_| {
            category_modal_open.set(false);
            category_name.set(String::new());
            category_icon.set("📁".to_string());
        })
    };
    let on_add_category = {
        let category_modal_open = category_modal_open.clone();
        let category_name = category_name.clone();
        let category_color = category_color.clone();
        let category_icon = category_icon.clone();
        let refresh_tick = refresh_tick.clone();
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let name = category_name.trim().to_string();
            if name.is_empty() {
                show_toast.emit((ToastKind::Warning, "Category name is required".to_string()));
                return;
            }
            let payload = CategoryPayload {
                name,
                color: (*category_color).clone(),
                icon: (*category_icon).clone(),
            };

            let category_modal_open = category_modal_open.clone();
            let category_name = category_name.clone();
            let category_icon = category_icon.clone();
            let refresh_tick = refresh_tick.clone();
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::categories::create(&payload).await {
                    Ok(_) => {
                        show_toast.emit((
                            ToastKind::Success,
                            "Category added successfully!".to_string(),
                        ));
                        category_modal_open.set(false);
                        category_name.set(String::new());
                        category_icon.set("📁".to_string());
                        refresh_tick.set((*refresh_tick).saturating_add(1));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "category create failed");
                        show_toast
                            .emit((ToastKind::Error, "Failed to add category".to_string()));
                    }
                }
            });
        })
    };

    let on_export = {
        let show_toast = show_toast.clone();
        Callback::from(move |_| {
            let show_toast = show_toast.clone();
            spawn_local(async move {
                match api::todos::export("json").await {
                    Ok(payload) => {
                        download_json(&payload);
                        show_toast.emit((
                            ToastKind::Success,
                            "Tasks exported successfully!".to_string(),
                        ));
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "export failed");
                        show_toast
                            .emit((ToastKind::Error, "Failed to export tasks".to_string()));
                    }
                }
            });
        })
    };

    let on_close_toast = {
        let toast = toast.clone();
        Callback::from(move |_| toast.set(None))
    };
    let on_open_profile = {
        let profile_open = profile_open.clone();
        Callback::from(move |_| profile_open.set(true))
    };
    let on_close_profile = {
        let profile_open = profile_open.clone();
        Callback::from(move |_| profile_open.set(false))
    };

    if !*session_checked {
        return html! {
            <div class={classes!("app", (*theme).as_class())}>
                <div class="boot-loading"><div class="spinner"></div></div>
            </div>
        };
    }

    let Some(user) = (*session).clone() else {
        return html! {
            <div class={classes!("app", (*theme).as_class())}>
                <AuthPanel
                    login_error={(*login_error).clone()}
                    register_errors={(*register_errors).clone()}
                    shake={*auth_shake}
                    on_login={on_login}
                    on_register={on_register}
                />
                <Toast toast={(*toast).clone()} on_close={on_close_toast} />
            </div>
        };
    };

    // Header stats derive from the cached list, like the rendered rows.
    let now = Utc::now();
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let active = tasks
        .iter()
        .filter(|task| !task.completed && !task.is_archived)
        .count();
    let overdue = tasks
        .iter()
        .filter(|task| is_overdue(task.due_date.as_deref(), task.completed, now))
        .count();

    let current_page = (*page).clamp(1, total.div_ceil(TASKS_PER_PAGE).max(1));
    let page_tasks: Vec<TaskDto> = tasks
        .iter()
        .skip((current_page - 1) * TASKS_PER_PAGE)
        .take(TASKS_PER_PAGE)
        .cloned()
        .collect();

    let insight_sections = vec![
        AccordionItem {
            title: "Statistics".to_string(),
            body: html! {
                <>
                    <ProductivityChart daily={stats.daily_activity.clone()} />
                    <CategoryChart slices={stats.categories.clone()} />
                </>
            },
        },
        AccordionItem {
            title: "Recent Activity".to_string(),
            body: html! { <ActivityFeed entries={(*activity).clone()} /> },
        },
    ];

    html! {
        <div class={classes!("app", (*theme).as_class())}>
            <div class="topbar">
                <div class="brand">{ "taskdeck" }</div>
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search tasks…"
                    value={(*search_text).clone()}
                    oninput={on_search_input}
                />
                <button class="btn" onclick={on_export}>{ "Export" }</button>
                <button class="btn" onclick={on_toggle_theme}>{ (*theme).toggle_label() }</button>
                <button class="avatar" title={user.display_name().to_string()} onclick={on_open_profile}>
                    { user.initials() }
                </button>
                <button class="btn" onclick={on_logout}>{ "Sign Out" }</button>
            </div>

            <div class="main">
                <CategorySidebar
                    categories={(*categories).clone()}
                    tasks={(*tasks).clone()}
                    active={*category_filter}
                    on_select={on_select_category}
                    on_new_category={on_open_category_modal}
                />

                <div class="panel list-panel">
                    <StatsPanel {total} {completed} {active} {overdue} />
                    <FilterTabs active={*status_filter} on_select={on_select_status} />
                    <BulkBar
                        bulk_mode={*bulk_mode}
                        selected_count={selected.len()}
                        on_toggle_mode={on_toggle_bulk_mode}
                        on_complete={on_bulk_complete}
                        on_archive={on_bulk_archive}
                        on_delete={on_bulk_delete}
                    />
                    {
                        if *tasks_loaded {
                            html! {
                                <>
                                    <TaskList
                                        tasks={page_tasks}
                                        bulk_mode={*bulk_mode}
                                        selected={(*selected).clone()}
                                        dragging={*dragging}
                                        drag_over={*drag_over}
                                        on_toggle_complete={on_toggle_complete}
                                        on_toggle_select={on_toggle_select}
                                        on_edit={on_edit}
                                        on_share={on_share_open}
                                        on_delete={on_delete}
                                        on_drag_start={on_drag_start}
                                        on_drag_over={on_drag_over}
                                        on_drag_end={on_drag_end}
                                        on_drop={on_drop}
                                    />
                                    <Pagination
                                        total_items={total}
                                        page={current_page}
                                        per_page={TASKS_PER_PAGE}
                                        on_page={on_page}
                                    />
                                </>
                            }
                        } else {
                            html! { <SkeletonList count={4} /> }
                        }
                    }
                </div>

                <div class="panel side-panel">
                    <TaskForm
                        form={(*form).clone()}
                        categories={(*categories).clone()}
                        on_change={on_form_change}
                        on_submit={on_form_submit}
                        on_cancel_edit={on_cancel_edit}
                    />
                    <Accordion items={insight_sections} />
                </div>
            </div>

            <ProfileModal
                open={*profile_open}
                user={Some(user.clone())}
                on_save={on_profile_save}
                on_close={on_close_profile}
            />

            <Modal
                open={*category_modal_open}
                title={"New Category".to_string()}
                on_close={on_close_category_modal.clone()}
            >
                <div class="field">
                    <label>{ "Name" }</label>
                    <input
                        type="text"
                        value={(*category_name).clone()}
                        oninput={{
                            let category_name = category_name.clone();
                            Callback::from(move |event: web_sys::InputEvent| {
                                let input: HtmlInputElement = event.target_unchecked_into();
                                category_name.set(input.value());
                            })
                        }}
                    />
                </div>
                <div class="field-row">
                    <div class="field">
                        <label>{ "Color" }</label>
                        <input
                            type="color"
                            value={(*category_color).clone()}
                            oninput={{
                                let category_color = category_color.clone();
                                Callback::from(move |event: web_sys::InputEvent| {
                                    let input: HtmlInputElement = event.target_unchecked_into();
                                    category_color.set(input.value());
                                })
                            }}
                        />
                    </div>
                    <div class="field">
                        <label>{ "Icon" }</label>
                        <input
                            type="text"
                            value={(*category_icon).clone()}
                            oninput={{
                                let category_icon = category_icon.clone();
                                Callback::from(move |event: web_sys::InputEvent| {
                                    let input: HtmlInputElement = event.target_unchecked_into();
                                    category_icon.set(input.value());
                                })
                            }}
                        />
                    </div>
                </div>
                <div class="actions">
                    <button class="btn primary" onclick={on_add_category}>{ "Add Category" }</button>
                </div>
            </Modal>

            <ShareModal
                task={*share_task}
                on_share={on_share_submit}
                on_close={on_share_close}
                on_search={on_share_search}
            />

            <ConfirmDialog
                message={(*confirm).clone().map(|state| state.message)}
                on_confirm={on_confirm}
                on_cancel={on_cancel_confirm}
            />

            <Toast toast={(*toast).clone()} on_close={{
                let toast = toast.clone();
                Callback::from(move |_| toast.set(None))
            }} />
        </div>
    }
}

fn stored_theme() -> Option<ThemeMode> {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(THEME_STORAGE_KEY).ok().flatten())
        .and_then(|value| ThemeMode::from_key(&value))
}

fn load_theme_mode() -> ThemeMode {
    stored_theme().unwrap_or(ThemeMode::Light)
}

fn save_theme_mode(theme: ThemeMode) {
    if let Some(storage) = web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    {
        let _ = storage.set_item(THEME_STORAGE_KEY, theme.storage_value());
    }
}

/// Hand the export payload to the browser as a JSON download.
fn download_json(payload: &serde_json::Value) {
    let Ok(text) = serde_json::to_string_pretty(payload) else {
        return;
    };

    let result = (|| -> Result<(), wasm_bindgen::JsValue> {
        let parts = js_sys::Array::new();
        parts.push(&wasm_bindgen::JsValue::from_str(&text));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type("application/json");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
        let anchor: web_sys::HtmlAnchorElement =
            document.create_element("a")?.unchecked_into();
        anchor.set_href(&url);
        anchor.set_download(&format!("todos_{}.json", Utc::now().format("%Y-%m-%d")));
        anchor.click();
        web_sys::Url::revoke_object_url(&url)?;
        Ok(())
    })();

    if let Err(error) = result {
        tracing::error!(?error, "export download failed");
    }
}

fn ui_debug(event: &str, detail: &str) {
    tracing::debug!(event, detail, "ui-debug");
    log!(format!("[ui-debug] {event}: {detail}"));
}
