use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use taskdeck_shared::due::{due_label, is_overdue};
use taskdeck_shared::filters::StatusFilter;
use taskdeck_shared::{
    ActivityEntry, CategoryDto, RecurrencePattern, TaskDto, TaskPriority, TodoPayload, UserDto,
};
use uuid::Uuid;
use web_sys::{DragEvent, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::{classes, function_component, html, use_state, Callback, Html, Properties, TargetCast};

use crate::ui::{EmptyState, ProgressBar, ACTIVITY_FEED_LIMIT};

#[derive(Properties, PartialEq)]
pub struct CategorySidebarProps {
    pub categories: Vec<CategoryDto>,
    pub tasks: Vec<TaskDto>,
    pub active: Option<Uuid>,
    pub on_select: Callback<Option<Uuid>>,
    pub on_new_category: Callback<()>,
}

#[function_component(CategorySidebar)]
pub fn category_sidebar(props: &CategorySidebarProps) -> Html {
    let on_select_all = props.on_select.clone();
    let on_new_category = props.on_new_category.clone();

    html! {
        <div class="panel sidebar">
            <div class="header">
                <span>{ "Categories" }</span>
                <button class="btn btn-small" onclick={move |_| on_new_category.emit(())}>
                    { "+ New" }
                </button>
            </div>
            <ul class="category-list">
                <li
                    class={classes!("category-item", props.active.is_none().then_some("active"))}
                    onclick={move |_| on_select_all.emit(None)}
                >
                    <span>{ "All Tasks" }</span>
                    <span class="category-count">{ props.tasks.len() }</span>
                </li>
                {
                    for props.categories.iter().map(|category| {
                        let id = category.id;
                        let count = props
                            .tasks
                            .iter()
                            .filter(|task| {
                                task.category.as_ref().is_some_and(|c| c.id == id)
                            })
                            .count();
                        let active = props.active == Some(id);
                        let on_select = props.on_select.clone();
                        html! {
                            <li
                                class={classes!("category-item", active.then_some("active"))}
                                onclick={move |_| on_select.emit(Some(id))}
                            >
                                <span>{ format!("{} {}", category.icon, category.name) }</span>
                                <span class="category-count">{ count }</span>
                            </li>
                        }
                    })
                }
            </ul>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterTabsProps {
    pub active: StatusFilter,
    pub on_select: Callback<StatusFilter>,
}

#[function_component(FilterTabs)]
pub fn filter_tabs(props: &FilterTabsProps) -> Html {
    html! {
        <div class="filter-tabs">
            {
                for StatusFilter::all().iter().copied().map(|status| {
                    let on_select = props.on_select.clone();
                    let active = props.active == status;
                    html! {
                        <button
                            class={classes!("filter-tab", active.then_some("active"))}
                            onclick={move |_| on_select.emit(status)}
                        >
                            { status.label() }
                        </button>
                    }
                })
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct BulkBarProps {
    pub bulk_mode: bool,
    pub selected_count: usize,
    pub on_toggle_mode: Callback<()>,
    pub on_complete: Callback<()>,
    pub on_archive: Callback<()>,
    pub on_delete: Callback<()>,
}

#[function_component(BulkBar)]
pub fn bulk_bar(props: &BulkBarProps) -> Html {
    let on_toggle_mode = props.on_toggle_mode.clone();
    let toggle_label = if props.bulk_mode { "Done Selecting" } else { "Select" };

    html! {
        <div class="bulk-bar">
            <button class="btn" onclick={move |_| on_toggle_mode.emit(())}>{ toggle_label }</button>
            {
                if props.bulk_mode {
                    let on_complete = props.on_complete.clone();
                    let on_archive = props.on_archive.clone();
                    let on_delete = props.on_delete.clone();
                    html! {
                        <>
                            <span class="bulk-count">{ format!("{} selected", props.selected_count) }</span>
                            <button class="btn ok" onclick={move |_| on_complete.emit(())}>{ "Complete" }</button>
                            <button class="btn" onclick={move |_| on_archive.emit(())}>{ "Archive" }</button>
                            <button class="btn danger" onclick={move |_| on_delete.emit(())}>{ "Delete" }</button>
                        </>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
    pub tasks: Vec<TaskDto>,
    pub bulk_mode: bool,
    pub selected: BTreeSet<Uuid>,
    pub dragging: Option<Uuid>,
    pub drag_over: Option<Uuid>,
    pub on_toggle_complete: Callback<Uuid>,
    pub on_toggle_select: Callback<Uuid>,
    pub on_edit: Callback<Uuid>,
    pub on_share: Callback<Uuid>,
    pub on_delete: Callback<Uuid>,
    pub on_drag_start: Callback<Uuid>,
    pub on_drag_over: Callback<Uuid>,
    pub on_drag_end: Callback<()>,
    pub on_drop: Callback<(Uuid, Uuid)>,
}

#[function_component(TaskList)]
pub fn task_list(props: &TaskListProps) -> Html {
    if props.tasks.is_empty() {
        return html! {
            <EmptyState message={"No tasks found. Create your first task!".to_string()} glyph={"📝".to_string()} />
        };
    }

    let now = Utc::now();

    html! {
        <ul class="todo-list">
            {
                for props.tasks.iter().map(|task| {
                    render_task_row(props, task, now)
                })
            }
        </ul>
    }
}

fn render_task_row(props: &TaskListProps, task: &TaskDto, now: DateTime<Utc>) -> Html {
    let id = task.id;
    let overdue = is_overdue(task.due_date.as_deref(), task.completed, now);
    let checked_for_bulk = props.selected.contains(&id);
    let is_dragging = props.dragging == Some(id);
    let is_drop_target = props.drag_over == Some(id) && props.dragging != Some(id);

    let ondragstart = {
        let on_drag_start = props.on_drag_start.clone();
        Callback::from(move |event: DragEvent| {
            if let Some(data_transfer) = event.data_transfer() {
                let _ = data_transfer.set_data("text/plain", &id.to_string());
                data_transfer.set_effect_allowed("move");
            }
            on_drag_start.emit(id);
        })
    };
    let ondragover = {
        let on_drag_over = props.on_drag_over.clone();
        Callback::from(move |event: DragEvent| {
            event.prevent_default();
            on_drag_over.emit(id);
        })
    };
    let ondragend = {
        let on_drag_end = props.on_drag_end.clone();
        Callback::from(move |_: DragEvent| on_drag_end.emit(()))
    };
    let ondrop = {
        let on_drop = props.on_drop.clone();
        Callback::from(move |event: DragEvent| {
            event.prevent_default();
            event.stop_propagation();
            if let Some(data_transfer) = event.data_transfer() {
                match data_transfer.get_data("text/plain") {
                    Ok(raw) => match Uuid::parse_str(raw.trim()) {
                        Ok(dragged) => on_drop.emit((dragged, id)),
                        Err(_) => tracing::warn!(raw, "dropped payload was not a task id"),
                    },
                    Err(error) => tracing::warn!(?error, "failed reading drag data"),
                }
            }
        })
    };

    let on_toggle_complete = props.on_toggle_complete.clone();
    let on_toggle_select = props.on_toggle_select.clone();
    let on_edit = props.on_edit.clone();
    let on_share = props.on_share.clone();
    let on_delete = props.on_delete.clone();

    html! {
        <li
            class={classes!(
                "todo-item",
                task.completed.then_some("completed"),
                task.is_pinned.then_some("pinned"),
                is_dragging.then_some("dragging"),
                is_drop_target.then_some("drop-target"),
            )}
            draggable="true"
            {ondragstart}
            {ondragover}
            {ondragend}
            {ondrop}
        >
            { if task.is_shared { html! { <span class="shared-indicator">{ "Shared" }</span> } } else { html! {} } }
            <div class="todo-header">
                {
                    if props.bulk_mode {
                        html! {
                            <input
                                type="checkbox"
                                class="bulk-select-checkbox"
                                checked={checked_for_bulk}
                                onchange={move |_| on_toggle_select.emit(id)}
                            />
                        }
                    } else {
                        html! {}
                    }
                }
                <input
                    type="checkbox"
                    class="todo-checkbox"
                    checked={task.completed}
                    onchange={move |_| on_toggle_complete.emit(id)}
                />
                <div class="todo-content">
                    <div class="todo-title">{ &task.title }</div>
                    {
                        if task.description.is_empty() {
                            html! {}
                        } else {
                            html! { <div class="todo-description">{ &task.description }</div> }
                        }
                    }
                    <div class="todo-meta">
                        {
                            if let Some(category) = &task.category {
                                html! {
                                    <span
                                        class="todo-category"
                                        style={format!("background:{}", category.color)}
                                    >
                                        { format!("{} {}", category.icon, category.name) }
                                    </span>
                                }
                            } else {
                                html! {}
                            }
                        }
                        <span class={classes!("todo-priority", priority_class(task.priority))}>
                            { task.priority.label() }
                        </span>
                        {
                            if let Some(due) = &task.due_date {
                                html! {
                                    <span class={classes!("todo-date", overdue.then_some("status-overdue"))}>
                                        { format!("{} {}", if overdue { "⚠️" } else { "📅" }, due_label(due)) }
                                    </span>
                                }
                            } else {
                                html! {}
                            }
                        }
                        {
                            if let Some(minutes) = task.estimated_minutes {
                                html! { <span class="todo-time">{ format!("⏱️ {minutes}m") }</span> }
                            } else {
                                html! {}
                            }
                        }
                        {
                            for task.tags.iter().map(|tag| html! {
                                <span class="todo-tag">{ tag }</span>
                            })
                        }
                    </div>
                    {
                        if task.comment_count > 0 {
                            html! { <div class="todo-comments-count">{ format!("💬 {} comments", task.comment_count) }</div> }
                        } else {
                            html! {}
                        }
                    }
                    {
                        if task.attachment_count > 0 {
                            html! { <div class="todo-attachments-count">{ format!("📎 {} files", task.attachment_count) }</div> }
                        } else {
                            html! {}
                        }
                    }
                </div>
                <div class="todo-actions">
                    <button class="btn btn-small" onclick={move |_| on_edit.emit(id)}>{ "✏️" }</button>
                    <button class="btn btn-small" onclick={move |_| on_share.emit(id)}>{ "🤝" }</button>
                    <button class="btn btn-small btn-danger" onclick={move |_| on_delete.emit(id)}>{ "🗑️" }</button>
                </div>
            </div>
        </li>
    }
}

fn priority_class(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "priority-low",
        TaskPriority::Medium => "priority-medium",
        TaskPriority::High => "priority-high",
    }
}

/// Draft state behind the create/update form. `editing` decides which
/// endpoint the submit hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFormState {
    pub editing: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub priority: String,
    pub due_date: String,
    pub estimated_minutes: String,
    pub is_pinned: bool,
    pub is_recurring: bool,
    pub tags_text: String,
    pub recurrence_pattern: String,
    pub recurrence_end_date: String,
    pub error: Option<String>,
}

impl TaskFormState {
    pub fn from_task(task: &TaskDto) -> Self {
        Self {
            editing: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            category_id: task
                .category
                .as_ref()
                .map(|category| category.id.to_string())
                .unwrap_or_default(),
            priority: task.priority.as_key().to_string(),
            due_date: task.due_date.clone().unwrap_or_default(),
            estimated_minutes: task
                .estimated_minutes
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            is_pinned: task.is_pinned,
            is_recurring: task.is_recurring,
            tags_text: task.tags.join(", "),
            recurrence_pattern: task.recurrence_pattern.as_key().to_string(),
            recurrence_end_date: task.recurrence_end_date.clone().unwrap_or_default(),
            error: None,
        }
    }

    pub fn to_payload(&self) -> Result<TodoPayload, String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }

        let category_id = if self.category_id.is_empty() {
            None
        } else {
            Some(
                Uuid::parse_str(&self.category_id)
                    .map_err(|_| "Unknown category".to_string())?,
            )
        };

        let (recurrence_pattern, recurrence_end_date) = if self.is_recurring {
            (
                Some(
                    RecurrencePattern::from_key(&self.recurrence_pattern)
                        .unwrap_or(RecurrencePattern::None),
                ),
                optional_text(&self.recurrence_end_date),
            )
        } else {
            (None, None)
        };

        Ok(TodoPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category_id,
            priority: TaskPriority::from_key(&self.priority).unwrap_or_default(),
            due_date: optional_text(&self.due_date),
            estimated_minutes: self.estimated_minutes.trim().parse().ok(),
            is_pinned: self.is_pinned,
            is_recurring: self.is_recurring,
            tags: parse_tags(&self.tags_text),
            recurrence_pattern,
            recurrence_end_date,
        })
    }
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Comma-separated tag input, empty entries dropped.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
    pub form: TaskFormState,
    pub categories: Vec<CategoryDto>,
    pub on_change: Callback<TaskFormState>,
    pub on_submit: Callback<()>,
    pub on_cancel_edit: Callback<()>,
}

#[function_component(TaskForm)]
pub fn task_form(props: &TaskFormProps) -> Html {
    let form = props.form.clone();
    let editing = form.editing.is_some();

    let edit_text = |apply: fn(&mut TaskFormState, String)| {
        let form = props.form.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = form.clone();
            apply(&mut next, input.value());
            on_change.emit(next);
        })
    };
    let edit_flag = |apply: fn(&mut TaskFormState, bool)| {
        let form = props.form.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: web_sys::Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = form.clone();
            apply(&mut next, input.checked());
            on_change.emit(next);
        })
    };
    let edit_select = |apply: fn(&mut TaskFormState, String)| {
        let form = props.form.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: web_sys::Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            let mut next = form.clone();
            apply(&mut next, select.value());
            on_change.emit(next);
        })
    };

    let on_description = {
        let form = props.form.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let area: HtmlTextAreaElement = event.target_unchecked_into();
            let mut next = form.clone();
            next.description = area.value();
            on_change.emit(next);
        })
    };

    let onsubmit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |event: web_sys::SubmitEvent| {
            event.prevent_default();
            on_submit.emit(());
        })
    };
    let on_cancel_edit = props.on_cancel_edit.clone();

    html! {
        <form class="todo-form" {onsubmit}>
            <div class="header">
                { if editing { "Edit Task" } else { "Add Task" } }
            </div>
            {
                if let Some(error) = &form.error {
                    html! { <div class="form-error">{ error }</div> }
                } else {
                    html! {}
                }
            }
            <div class="field">
                <label>{ "Title" }</label>
                <input
                    type="text"
                    value={form.title.clone()}
                    oninput={edit_text(|form, value| form.title = value)}
                />
            </div>
            <div class="field">
                <label>{ "Description" }</label>
                <textarea value={form.description.clone()} oninput={on_description} />
            </div>
            <div class="field-row">
                <div class="field">
                    <label>{ "Category" }</label>
                    <select value={form.category_id.clone()} onchange={edit_select(|form, value| form.category_id = value)}>
                        <option value="">{ "No Category" }</option>
                        {
                            for props.categories.iter().map(|category| html! {
                                <option value={category.id.to_string()} selected={form.category_id == category.id.to_string()}>
                                    { format!("{} {}", category.icon, category.name) }
                                </option>
                            })
                        }
                    </select>
                </div>
                <div class="field">
                    <label>{ "Priority" }</label>
                    <select value={form.priority.clone()} onchange={edit_select(|form, value| form.priority = value)}>
                        <option value="low" selected={form.priority == "low"}>{ "Low" }</option>
                        <option value="medium" selected={form.priority.is_empty() || form.priority == "medium"}>{ "Medium" }</option>
                        <option value="high" selected={form.priority == "high"}>{ "High" }</option>
                    </select>
                </div>
            </div>
            <div class="field-row">
                <div class="field">
                    <label>{ "Due Date" }</label>
                    <input
                        type="datetime-local"
                        value={form.due_date.clone()}
                        oninput={edit_text(|form, value| form.due_date = value)}
                    />
                </div>
                <div class="field">
                    <label>{ "Estimated Minutes" }</label>
                    <input
                        type="number"
                        min="0"
                        value={form.estimated_minutes.clone()}
                        oninput={edit_text(|form, value| form.estimated_minutes = value)}
                    />
                </div>
            </div>
            <div class="field">
                <label>{ "Tags (comma separated)" }</label>
                <input
                    type="text"
                    value={form.tags_text.clone()}
                    oninput={edit_text(|form, value| form.tags_text = value)}
                />
            </div>
            <div class="field-row">
                <label class="checkbox-label">
                    <input
                        type="checkbox"
                        checked={form.is_pinned}
                        onchange={edit_flag(|form, value| form.is_pinned = value)}
                    />
                    { "Pin to top" }
                </label>
                <label class="checkbox-label">
                    <input
                        type="checkbox"
                        checked={form.is_recurring}
                        onchange={edit_flag(|form, value| form.is_recurring = value)}
                    />
                    { "Recurring" }
                </label>
            </div>
            {
                if form.is_recurring {
                    html! {
                        <div class="field-row recurrence-options">
                            <div class="field">
                                <label>{ "Repeats" }</label>
                                <select
                                    value={form.recurrence_pattern.clone()}
                                    onchange={edit_select(|form, value| form.recurrence_pattern = value)}
                                >
                                    <option value="daily" selected={form.recurrence_pattern == "daily"}>{ "Daily" }</option>
                                    <option value="weekly" selected={form.recurrence_pattern == "weekly"}>{ "Weekly" }</option>
                                    <option value="monthly" selected={form.recurrence_pattern == "monthly"}>{ "Monthly" }</option>
                                    <option value="yearly" selected={form.recurrence_pattern == "yearly"}>{ "Yearly" }</option>
                                </select>
                            </div>
                            <div class="field">
                                <label>{ "Until" }</label>
                                <input
                                    type="date"
                                    value={form.recurrence_end_date.clone()}
                                    oninput={edit_text(|form, value| form.recurrence_end_date = value)}
                                />
                            </div>
                        </div>
                    }
                } else {
                    html! {}
                }
            }
            <div class="actions">
                <button type="submit" class="btn primary">
                    { if editing { "Save Changes" } else { "Add Task" } }
                </button>
                {
                    if editing {
                        html! {
                            <button type="button" class="btn" onclick={move |_| on_cancel_edit.emit(())}>
                                { "Cancel" }
                            </button>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatsPanelProps {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
}

#[function_component(StatsPanel)]
pub fn stats_panel(props: &StatsPanelProps) -> Html {
    let completion_rate = completion_rate(props.completed, props.total);

    html! {
        <div class="stats-panel">
            <div class="stat"><strong>{ props.total }</strong><span>{ "Total" }</span></div>
            <div class="stat"><strong>{ props.completed }</strong><span>{ "Completed" }</span></div>
            <div class="stat"><strong>{ props.active }</strong><span>{ "Active" }</span></div>
            <div class="stat"><strong>{ props.overdue }</strong><span>{ "Overdue" }</span></div>
            <div class="stat wide">
                <strong>{ format!("{completion_rate}%") }</strong>
                <ProgressBar percent={completion_rate} />
            </div>
        </div>
    }
}

pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Properties, PartialEq)]
pub struct ActivityFeedProps {
    pub entries: Vec<ActivityEntry>,
}

#[function_component(ActivityFeed)]
pub fn activity_feed(props: &ActivityFeedProps) -> Html {
    if props.entries.is_empty() {
        return html! { <p class="text-muted">{ "No recent activity" }</p> };
    }

    let now = Utc::now();
    html! {
        <div class="activity-list">
            {
                for props.entries.iter().take(ACTIVITY_FEED_LIMIT).map(|entry| {
                    html! {
                        <div class="activity-item">
                            <div class="activity-icon">{ entry.action.glyph() }</div>
                            <div class="activity-content">
                                <div>
                                    { entry.action.verb() }
                                    { " " }
                                    <strong>{ format!("\u{201c}{}\u{201d}", entry.todo_title) }</strong>
                                </div>
                                <div class="activity-time">{ relative_time(&entry.timestamp, now) }</div>
                            </div>
                        </div>
                    }
                })
            }
        </div>
    }
}

/// Coarse "n units ago" label for the activity feed.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let elapsed = now.signed_duration_since(parsed.with_timezone(&Utc));

    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", elapsed.num_days())
}

#[derive(Properties, PartialEq)]
pub struct ShareModalProps {
    pub task: Option<Uuid>,
    pub on_share: Callback<Vec<u64>>,
    pub on_close: Callback<()>,
    pub on_search: Callback<(String, Callback<Vec<UserDto>>)>,
}

/// User picker behind the share action. Search results come back through
/// the `on_search` request callback so the network stays in the app layer.
#[function_component(ShareModal)]
pub fn share_modal(props: &ShareModalProps) -> Html {
    let query = use_state(String::new);
    let results = use_state(Vec::<UserDto>::new);
    let chosen = use_state(Vec::<UserDto>::new);

    if props.task.is_none() {
        return html! {};
    }

    let on_query = {
        let query = query.clone();
        let results = results.clone();
        let on_search = props.on_search.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let value = input.value();
            query.set(value.clone());
            if value.trim().len() < 2 {
                results.set(Vec::new());
                return;
            }
            let results = results.clone();
            on_search.emit((
                value,
                Callback::from(move |found: Vec<UserDto>| results.set(found)),
            ));
        })
    };

    let on_submit = {
        let chosen = chosen.clone();
        let on_share = props.on_share.clone();
        Callback::from(move |_| {
            on_share.emit(chosen.iter().map(|user| user.id).collect());
        })
    };
    let on_close = props.on_close.clone();
    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };

    html! {
        <div class="modal active" onclick={on_backdrop}>
            <div class="modal-content" onclick={|event: web_sys::MouseEvent| event.stop_propagation()}>
                <div class="modal-header">
                    <h3>{ "Share Task" }</h3>
                    <button class="close-btn" onclick={move |_| on_close.emit(())}>{ "✕" }</button>
                </div>
                <div class="field">
                    <label>{ "Find people" }</label>
                    <input type="text" value={(*query).clone()} oninput={on_query} />
                </div>
                <div class="user-search-results">
                    {
                        for results.iter().cloned().map(|user| {
                            let chosen = chosen.clone();
                            let results = results.clone();
                            let query = query.clone();
                            let label = format!("{} <{}>", user.display_name(), user.email);
                            html! {
                                <div
                                    class="user-search-item"
                                    onclick={move |_| {
                                        let mut next = (*chosen).clone();
                                        if !next.iter().any(|existing| existing.id == user.id) {
                                            next.push(user.clone());
                                        }
                                        chosen.set(next);
                                        results.set(Vec::new());
                                        query.set(String::new());
                                    }}
                                >
                                    { label }
                                </div>
                            }
                        })
                    }
                </div>
                <div class="selected-users">
                    {
                        for chosen.iter().cloned().map(|user| {
                            let chosen = chosen.clone();
                            let username = user.username.clone();
                            html! {
                                <span class="selected-user">
                                    { username }
                                    <button onclick={move |_| {
                                        let next: Vec<UserDto> = chosen
                                            .iter()
                                            .filter(|existing| existing.id != user.id)
                                            .cloned()
                                            .collect();
                                        chosen.set(next);
                                    }}>{ "✕" }</button>
                                </span>
                            }
                        })
                    }
                </div>
                <div class="actions">
                    <button class="btn primary" onclick={on_submit}>{ "Share" }</button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod component_tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn tags_split_on_commas_and_drop_blanks() {
        assert_eq!(
            parse_tags("home, urgent , ,errands"),
            vec!["home", "urgent", "errands"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn empty_title_blocks_the_payload() {
        let form = TaskFormState {
            title: "   ".to_string(),
            ..TaskFormState::default()
        };
        assert_eq!(form.to_payload(), Err("Title is required".to_string()));
    }

    #[test]
    fn recurrence_fields_only_apply_when_checked() {
        let mut form = TaskFormState {
            title: "Water plants".to_string(),
            recurrence_pattern: "weekly".to_string(),
            recurrence_end_date: "2025-01-01".to_string(),
            ..TaskFormState::default()
        };

        let payload = form.to_payload().expect("payload without recurrence");
        assert!(payload.recurrence_pattern.is_none());
        assert!(payload.recurrence_end_date.is_none());

        form.is_recurring = true;
        let payload = form.to_payload().expect("payload with recurrence");
        assert_eq!(payload.recurrence_pattern, Some(RecurrencePattern::Weekly));
        assert_eq!(payload.recurrence_end_date.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn form_round_trips_a_task() {
        let task = TaskDto {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
            completed: false,
            priority: TaskPriority::High,
            due_date: None,
            category: None,
            tags: vec!["errands".to_string(), "home".to_string()],
            is_pinned: true,
            is_archived: false,
            is_shared: false,
            is_recurring: false,
            recurrence_pattern: RecurrencePattern::None,
            recurrence_end_date: None,
            estimated_minutes: Some(15),
            comment_count: 0,
            attachment_count: 0,
            position: 0,
            created_at: None,
            completed_at: None,
        };

        let form = TaskFormState::from_task(&task);
        assert_eq!(form.editing, Some(task.id));
        assert_eq!(form.tags_text, "errands, home");

        let payload = form.to_payload().expect("round-tripped payload");
        assert_eq!(payload.title, "Buy milk");
        assert_eq!(payload.priority, TaskPriority::High);
        assert_eq!(payload.estimated_minutes, Some(15));
        assert_eq!(payload.tags, vec!["errands", "home"]);
        assert!(payload.due_date.is_none());
    }

    #[test]
    fn completion_rate_rounds_and_handles_empty() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(3, 3), 100);
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).single().expect("now");
        assert_eq!(relative_time("2024-05-20T11:59:40Z", now), "just now");
        assert_eq!(relative_time("2024-05-20T11:30:00Z", now), "30m ago");
        assert_eq!(relative_time("2024-05-20T07:00:00Z", now), "5h ago");
        assert_eq!(relative_time("2024-05-17T12:00:00Z", now), "3d ago");
        assert_eq!(relative_time("yesterday", now), "yesterday");
    }
}
