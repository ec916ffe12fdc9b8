use dioxus::prelude::*;
use fieldwork_core::{Error, SessionPersistence, WorkOrder, WorkOrderApi};

use crate::config::resolve_client_config;
use crate::navigation::{HeaderTab, Navigator, Screen};
use crate::secret_store::SecureSessionStore;
use crate::ui::{ErrorBanner, MOBILE_UI_STYLES};
use crate::views::{
    AddWorkOrderView, AnnotatePdfView, CalendarView, DrawNoteView, EditWorkOrderView, HomeView,
    LoginView, WorkOrderDetailView, WorkOrderListView,
};

pub type Api = WorkOrderApi<SecureSessionStore>;

/// Client handle passed to the shell. Built once at launch and never replaced.
#[derive(Clone)]
pub struct ApiHandle(Api);

impl PartialEq for ApiHandle {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn build_api() -> Result<Api, String> {
    let resolved = resolve_client_config().map_err(|error| error.to_string())?;
    tracing::info!(
        "Using work order API at {} ({:?})",
        resolved.client.api_base_url,
        resolved.source
    );
    WorkOrderApi::new(resolved.client, SecureSessionStore::default()).map_err(|error| error.to_string())
}

#[component]
pub fn App() -> Element {
    let api = use_hook(build_api);

    rsx! {
        style { {MOBILE_UI_STYLES} }
        match api {
            Ok(api) => rsx! { Shell { api: ApiHandle(api) } },
            Err(message) => rsx! {
                div {
                    class: "ui-screen",
                    ErrorBanner { message: Some(format!("Fieldwork could not start: {message}")) }
                }
            },
        }
    }
}

#[component]
fn Shell(api: ApiHandle) -> Element {
    let api = use_context_provider(|| api.0.clone());
    let store = api.store().clone();
    let mut navigator = use_signal(|| Navigator::for_session(api.store()));
    use_context_provider(|| navigator);

    use_effect(move || {
        let needs_login = {
            let current = navigator.read().current();
            current.requires_session() && !matches!(store.load_session(), Ok(Some(_)))
        };
        if needs_login {
            navigator.write().reset(Screen::Login);
        }
    });

    let current = navigator.read().current();
    let tabs = navigator.read().tabs();
    let can_go_back = navigator.read().can_go_back();
    let title = current.title();

    rsx! {
        if !tabs.is_empty() {
            nav {
                class: "ui-header",
                if can_go_back {
                    button {
                        onclick: move |_| {
                            navigator.write().back();
                        },
                        "‹ Back"
                    }
                }
                for tab in tabs.iter().copied() {
                    button {
                        key: "{tab.label()}",
                        "data-active": is_tab_active(tab, current).to_string(),
                        onclick: {
                            let api = api.clone();
                            move |_| {
                                if let Err(error) = navigator.write().select_tab(tab, api.store()) {
                                    tracing::warn!("Logout did not clear the stored session: {}", error);
                                }
                            }
                        },
                        "{tab.label()}"
                    }
                }
            }
        }
        main {
            class: "ui-screen",
            h2 { style: "margin: 4px 0;", "{title}" }
            match current {
                Screen::Login => rsx! { LoginView {} },
                Screen::Home => rsx! { HomeView {} },
                Screen::WorkOrders => rsx! { WorkOrderListView {} },
                Screen::Calendar => rsx! { CalendarView {} },
                Screen::ViewWorkOrder(id) => rsx! { WorkOrderDetailView { key: "{id}", id } },
                Screen::AddWorkOrder => rsx! { AddWorkOrderView {} },
                Screen::EditWorkOrder(id) => rsx! { EditWorkOrderView { key: "{id}", id } },
                Screen::AnnotatePdf(id) => rsx! { AnnotatePdfView { key: "{id}", id } },
                Screen::DrawNote(id) => rsx! { DrawNoteView { key: "{id}", id } },
            }
        }
    }
}

fn is_tab_active(tab: HeaderTab, current: Screen) -> bool {
    matches!(
        (tab, current),
        (HeaderTab::Home, Screen::Home)
            | (HeaderTab::WorkOrders, Screen::WorkOrders)
            | (HeaderTab::Calendar, Screen::Calendar)
    )
}

pub fn use_api() -> Api {
    use_context::<Api>()
}

pub fn use_navigator() -> Signal<Navigator> {
    use_context::<Signal<Navigator>>()
}

/// Banner text for a failed request. A 401 instead drops the session and
/// routes to login, so there is nothing to show.
pub fn report_error(error: &Error, api: &Api, mut navigator: Signal<Navigator>) -> Option<String> {
    if error.requires_login() {
        navigator.write().on_auth_failure(api.store());
        None
    } else {
        tracing::warn!("Request failed: {}", error);
        Some(error.user_message())
    }
}

/// The work order list, fetched once when the calling view mounts.
#[derive(Clone, Copy)]
pub struct WorkOrdersState {
    pub orders: Signal<Vec<WorkOrder>>,
    pub loading: Signal<bool>,
    pub error: Signal<Option<String>>,
}

pub fn use_work_orders() -> WorkOrdersState {
    let api = use_api();
    let navigator = use_navigator();
    let mut orders = use_signal(Vec::<WorkOrder>::new);
    let mut loading = use_signal(|| true);
    let mut error = use_signal(|| None::<String>);

    use_future(move || {
        let api = api.clone();
        async move {
            loading.set(true);
            match api.list_work_orders().await {
                Ok(list) => {
                    orders.set(list);
                    error.set(None);
                }
                Err(failure) => error.set(report_error(&failure, &api, navigator)),
            }
            loading.set(false);
        }
    });

    WorkOrdersState {
        orders,
        loading,
        error,
    }
}
