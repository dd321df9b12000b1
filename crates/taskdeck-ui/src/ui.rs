use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent};
use yew::{classes, function_component, html, use_effect_with, use_node_ref, use_state, Callback,
    Children, Html, Properties};

/// Toasts dismiss themselves after this long; zero disables auto-dismiss.
pub const TOAST_DURATION_MS: u32 = 5_000;

pub const ACTIVITY_FEED_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_class(self) -> &'static str {
        match self {
            Self::Success => "success-message",
            Self::Error => "error-message",
            Self::Warning => "warning-message",
            Self::Info => "info-message",
        }
    }
}

/// The single visible toast; a newer one replaces it outright.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastState {
    pub kind: ToastKind,
    pub message: String,
    pub duration_ms: u32,
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub toast: Option<ToastState>,
    pub on_close: Callback<()>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let Some(toast) = &props.toast else {
        return html! {};
    };

    let on_close = props.on_close.clone();
    html! {
        <div class={classes!("notification-toast", toast.kind.as_class())}>
            <span>{ &toast.message }</span>
            <button class="close-btn" onclick={move |_| on_close.emit(())}>{ "✕" }</button>
        </div>
    }
}

fn set_scroll_locked(locked: bool) {
    let body = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body());
    if let Some(body) = body {
        let value = if locked { "hidden" } else { "" };
        if let Err(error) = body.style().set_property("overflow", value) {
            tracing::warn!(?error, "failed to toggle page scroll lock");
        }
    }
}

/// Tab-cycle containment inside an open modal.
pub fn handle_focus_trap(event: &KeyboardEvent, container: &HtmlElement) {
    if event.key() != "Tab" {
        return;
    }

    let Ok(focusable) = container.query_selector_all(
        "a[href], button, textarea, input, select",
    ) else {
        return;
    };
    if focusable.length() == 0 {
        return;
    }

    let first = focusable.get(0).and_then(|node| node.dyn_into::<HtmlElement>().ok());
    let last = focusable
        .get(focusable.length() - 1)
        .and_then(|node| node.dyn_into::<HtmlElement>().ok());
    let (Some(first), Some(last)) = (first, last) else {
        return;
    };

    let active = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.active_element());
    let at_edge = |edge: &HtmlElement| {
        active
            .as_ref()
            .is_some_and(|element| element.is_same_node(Some(edge.unchecked_ref())))
    };

    if event.shift_key() {
        if at_edge(&first) {
            event.prevent_default();
            let _ = last.focus();
        }
    } else if at_edge(&last) {
        event.prevent_default();
        let _ = first.focus();
    }
}

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub open: bool,
    pub title: String,
    pub on_close: Callback<()>,
    pub children: Children,
}

#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let content_ref = use_node_ref();

    {
        use_effect_with(props.open, move |open| {
            set_scroll_locked(*open);
            || set_scroll_locked(false)
        });
    }

    if !props.open {
        return html! {};
    }

    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };
    let on_close_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };
    let onkeydown = {
        let content_ref = content_ref.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Escape" {
                on_close.emit(());
                return;
            }
            if let Some(container) = content_ref.cast::<HtmlElement>() {
                handle_focus_trap(&event, &container);
            }
        })
    };

    html! {
        <div class="modal active" onclick={on_backdrop}>
            <div
                ref={content_ref}
                class="modal-content"
                onclick={|event: web_sys::MouseEvent| event.stop_propagation()}
                {onkeydown}
            >
                <div class="modal-header">
                    <h3>{ &props.title }</h3>
                    <button class="close-btn" onclick={on_close_click}>{ "✕" }</button>
                </div>
                { for props.children.iter() }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfirmDialogProps {
    pub message: Option<String>,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

/// Blocking-by-callback confirmation; clicking the backdrop cancels.
#[function_component(ConfirmDialog)]
pub fn confirm_dialog(props: &ConfirmDialogProps) -> Html {
    let Some(message) = &props.message else {
        return html! {};
    };

    let on_confirm = props.on_confirm.clone();
    let on_cancel = props.on_cancel.clone();
    let on_backdrop = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div class="modal active" onclick={on_backdrop}>
            <div class="modal-content confirm" onclick={|event: web_sys::MouseEvent| event.stop_propagation()}>
                <h3>{ "Confirm Action" }</h3>
                <p>{ message }</p>
                <div class="actions">
                    <button class="btn btn-danger" onclick={move |_| on_confirm.emit(())}>{ "Confirm" }</button>
                    <button class="btn btn-secondary" onclick={move |_| on_cancel.emit(())}>{ "Cancel" }</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    pub message: String,
    #[prop_or("📋".to_string())]
    pub glyph: String,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div class="empty-state">
            <div class="empty-glyph">{ &props.glyph }</div>
            <p>{ &props.message }</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SkeletonProps {
    #[prop_or(3)]
    pub count: usize,
}

#[function_component(SkeletonList)]
pub fn skeleton_list(props: &SkeletonProps) -> Html {
    html! {
        <div class="skeleton-list">
            {
                for (0..props.count).map(|index| {
                    // Stagger widths so the placeholder doesn't look stamped.
                    let width = 60 + (index * 13) % 40;
                    html! {
                        <div class="skeleton-item">
                            <div class="skeleton skeleton-title" style={format!("width:{width}%")}></div>
                            <div class="skeleton skeleton-text" style={format!("width:{}%", width / 2)}></div>
                        </div>
                    }
                })
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProgressBarProps {
    pub percent: u32,
}

#[function_component(ProgressBar)]
pub fn progress_bar(props: &ProgressBarProps) -> Html {
    let percent = props.percent.min(100);
    html! {
        <div class="progress-track">
            <div
                class="progress-bar"
                style={format!("width:{percent}%")}
                aria-valuenow={percent.to_string()}
                aria-valuemax="100"
            ></div>
        </div>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Current(usize),
    Ellipsis,
}

/// Window of page buttons around the current page (1-based): the first
/// and last page always show, pages within ±2 of the current show, and a
/// single ellipsis stands in for each elided run.
pub fn page_items(total_pages: usize, current: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    for page in 1..=total_pages {
        if page == current {
            items.push(PageItem::Current(page));
        } else if page == 1
            || page == total_pages
            || (page + 2 >= current && page <= current + 2)
        {
            items.push(PageItem::Page(page));
        } else if items.last() != Some(&PageItem::Ellipsis) {
            items.push(PageItem::Ellipsis);
        }
    }
    items
}

#[derive(Properties, PartialEq)]
pub struct PaginationProps {
    pub total_items: usize,
    pub page: usize,
    pub per_page: usize,
    pub on_page: Callback<usize>,
}

#[function_component(Pagination)]
pub fn pagination(props: &PaginationProps) -> Html {
    let total_pages = props.total_items.div_ceil(props.per_page.max(1));
    if total_pages <= 1 {
        return html! {};
    }

    let current = props.page.clamp(1, total_pages);
    let prev = {
        let on_page = props.on_page.clone();
        let target = current - 1;
        Callback::from(move |_| on_page.emit(target))
    };
    let next = {
        let on_page = props.on_page.clone();
        let target = current + 1;
        Callback::from(move |_| on_page.emit(target))
    };

    html! {
        <div class="pagination">
            {
                if current > 1 {
                    html! { <button class="btn btn-small" onclick={prev}>{ "Previous" }</button> }
                } else {
                    html! {}
                }
            }
            {
                for page_items(total_pages, current).into_iter().map(|item| match item {
                    PageItem::Current(page) => html! { <span class="current-page">{ page }</span> },
                    PageItem::Page(page) => {
                        let on_page = props.on_page.clone();
                        html! {
                            <button class="btn btn-small" onclick={move |_| on_page.emit(page)}>
                                { page }
                            </button>
                        }
                    }
                    PageItem::Ellipsis => html! { <span class="page-gap">{ "…" }</span> },
                })
            }
            {
                if current < total_pages {
                    html! { <button class="btn btn-small" onclick={next}>{ "Next" }</button> }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

#[derive(Clone, PartialEq)]
pub struct AccordionItem {
    pub title: String,
    pub body: Html,
}

#[derive(Properties, PartialEq)]
pub struct AccordionProps {
    pub items: Vec<AccordionItem>,
}

/// One section open at a time; clicking the open header closes it.
#[function_component(Accordion)]
pub fn accordion(props: &AccordionProps) -> Html {
    let open = use_state(|| Some(0_usize));

    html! {
        <div class="accordion">
            {
                for props.items.iter().enumerate().map(|(index, item)| {
                    let is_open = *open == Some(index);
                    let open = open.clone();
                    let on_toggle = Callback::from(move |_| {
                        open.set(if *open == Some(index) { None } else { Some(index) });
                    });
                    html! {
                        <div class={classes!("accordion-section", is_open.then_some("open"))}>
                            <button class="accordion-header" onclick={on_toggle}>
                                { &item.title }
                            </button>
                            {
                                if is_open {
                                    html! { <div class="accordion-body">{ item.body.clone() }</div> }
                                } else {
                                    html! {}
                                }
                            }
                        </div>
                    }
                })
            }
        </div>
    }
}

#[cfg(test)]
mod ui_tests {
    use super::*;

    #[test]
    fn small_page_counts_have_no_ellipsis() {
        let items = page_items(3, 2);
        assert_eq!(
            items,
            vec![
                PageItem::Page(1),
                PageItem::Current(2),
                PageItem::Page(3),
            ]
        );
    }

    #[test]
    fn distant_pages_collapse_into_one_ellipsis_per_side() {
        let items = page_items(20, 10);
        assert_eq!(
            items,
            vec![
                PageItem::Page(1),
                PageItem::Ellipsis,
                PageItem::Page(8),
                PageItem::Page(9),
                PageItem::Current(10),
                PageItem::Page(11),
                PageItem::Page(12),
                PageItem::Ellipsis,
                PageItem::Page(20),
            ]
        );
    }

    #[test]
    fn first_page_window_reaches_the_left_edge() {
        let items = page_items(10, 1);
        assert_eq!(items[0], PageItem::Current(1));
        assert!(items.contains(&PageItem::Page(3)));
        assert!(items.contains(&PageItem::Ellipsis));
        assert_eq!(*items.last().expect("last item"), PageItem::Page(10));
    }
}
