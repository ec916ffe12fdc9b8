//! Screen stack and header tabs.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use fieldwork_core::{Result, SessionPersistence, WorkOrderId};

/// Every screen the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
    WorkOrders,
    Calendar,
    ViewWorkOrder(WorkOrderId),
    AddWorkOrder,
    EditWorkOrder(WorkOrderId),
    AnnotatePdf(WorkOrderId),
    DrawNote(WorkOrderId),
}

impl Screen {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Home => "Home",
            Self::WorkOrders => "Work Orders",
            Self::Calendar => "Calendar",
            Self::ViewWorkOrder(_) => "Work Order",
            Self::AddWorkOrder => "Add Work Order",
            Self::EditWorkOrder(_) => "Edit Work Order",
            Self::AnnotatePdf(_) => "Sign PDF",
            Self::DrawNote(_) => "Draw Note",
        }
    }

    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// Buttons in the header bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTab {
    Home,
    WorkOrders,
    Calendar,
    Logout,
}

impl HeaderTab {
    pub const ALL: [Self; 4] = [Self::Home, Self::WorkOrders, Self::Calendar, Self::Logout];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::WorkOrders => "Work Orders",
            Self::Calendar => "Calendar",
            Self::Logout => "Logout",
        }
    }

    const fn screen(self) -> Option<Screen> {
        match self {
            Self::Home => Some(Screen::Home),
            Self::WorkOrders => Some(Screen::WorkOrders),
            Self::Calendar => Some(Screen::Calendar),
            Self::Logout => None,
        }
    }
}

/// Stack of visited screens. The bottom entry is never popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Navigator {
    pub fn new(initial: Screen) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    /// Starts on Home when a session is stored, on Login otherwise.
    pub fn for_session<S: SessionPersistence>(store: &S) -> Self {
        match store.load_session() {
            Ok(Some(_)) => Self::new(Screen::Home),
            Ok(None) => Self::new(Screen::Login),
            Err(error) => {
                tracing::warn!("Could not read stored session: {}", error);
                Self::new(Screen::Login)
            }
        }
    }

    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Login)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn push(&mut self, screen: Screen) {
        if self.current() != screen {
            self.stack.push(screen);
        }
    }

    /// Swaps the top screen, e.g. after a successful save.
    pub fn replace(&mut self, screen: Screen) {
        self.stack.pop();
        self.stack.push(screen);
    }

    /// Pops one screen; returns false when already at the root.
    pub fn back(&mut self) -> bool {
        if self.can_go_back() {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Clears the stack down to `screen`.
    pub fn reset(&mut self, screen: Screen) {
        self.stack.clear();
        self.stack.push(screen);
    }

    /// Header tabs are shown on every screen except Login.
    pub fn tabs(&self) -> &'static [HeaderTab] {
        if self.current() == Screen::Login {
            &[]
        } else {
            &HeaderTab::ALL
        }
    }

    /// Tabs reset the stack to their root screen; Logout clears the session.
    pub fn select_tab<S: SessionPersistence>(&mut self, tab: HeaderTab, store: &S) -> Result<()> {
        match tab.screen() {
            Some(screen) => {
                self.reset(screen);
                Ok(())
            }
            None => self.logout(store),
        }
    }

    pub fn logout<S: SessionPersistence>(&mut self, store: &S) -> Result<()> {
        self.reset(Screen::Login);
        store.clear_session()
    }

    /// Called on any 401: the session is gone and only Login remains.
    pub fn on_auth_failure<S: SessionPersistence>(&mut self, store: &S) {
        if let Err(error) = store.clear_session() {
            tracing::warn!("Failed to clear session after 401: {}", error);
        }
        self.reset(Screen::Login);
    }

    /// After login the stack restarts at Home.
    pub fn on_login(&mut self) {
        self.reset(Screen::Home);
    }

    /// Redirects to Login when the current screen needs a session and none
    /// is stored. Returns true when a redirect happened.
    pub fn guard<S: SessionPersistence>(&mut self, store: &S) -> bool {
        if !self.current().requires_session() {
            return false;
        }
        if matches!(store.load_session(), Ok(Some(_))) {
            return false;
        }
        self.reset(Screen::Login);
        true
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Screen::Login)
    }
}
