//! Application controller.
//!
//! [`App`] owns everything the site keeps between interactions and routes
//! user actions to handlers through a table keyed by action name. Each
//! handler returns an [`Outcome`]: the page to show, if it changed, and a
//! short notice for the user.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info};

use crate::auth::AuthStore;
use crate::chart::{self, Dashboard};
use crate::config::Config;
use crate::donor::DonorRecord;
use crate::error::{Error, Result};
use crate::explore;
use crate::generator::DemoGenerator;
use crate::map::{self, MapView};
use crate::registry::{Registration, Registry};
use crate::render::{self, View};
use crate::storage::KeyValueStore;

/// Store handle shared by the registry, auth and explore state.
pub type SharedStore = Rc<dyn KeyValueStore>;

/// Signature of an action handler.
pub type Handler = fn(&mut App, &ActionPayload) -> Result<Outcome>;

/// Notice shown after a successful registration.
pub const REGISTERED: &str = "🎉 Registration Successful! Welcome to Saviour.";

/// Name used in the contact notice when the donor id is unknown.
const UNKNOWN_CONTACT: &str = "donor";

/// A top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Donor grid.
    #[default]
    Home,
    /// Donor map.
    MapView,
    /// Charts.
    Dashboard,
    /// Registration form.
    Donate,
}

impl Route {
    /// All routes.
    pub const ALL: [Route; 4] = [Route::Home, Route::MapView, Route::Dashboard, Route::Donate];

    /// Resolve a route id. Unknown ids resolve to [`Route::Home`].
    #[must_use]
    pub fn resolve(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|route| route.id() == id.trim())
            .unwrap_or_default()
    }

    /// The route id used in links.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::MapView => "map-view",
            Self::Dashboard => "dashboard",
            Self::Donate => "donate",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Kind of transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// The action succeeded.
    Success,
    /// The action was rejected.
    Error,
    /// Informational.
    Info,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// How to present the message.
    pub kind: NoticeKind,
    /// The message.
    pub text: String,
}

impl Notice {
    /// A success notice.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// An error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// An informational notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }
}

/// Content of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", content = "data", rename_all = "kebab-case")]
pub enum Page {
    /// Rendered donor list markup.
    Donors(String),
    /// Map description.
    Map(MapView),
    /// Dashboard data.
    Dashboard(Dashboard),
    /// The registration form, which has no dynamic content.
    Donate,
}

/// Result of an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    /// New page content, if the action changed what is shown.
    pub page: Option<Page>,
    /// Message for the user.
    pub notice: Option<Notice>,
}

impl Outcome {
    fn page(page: Page) -> Self {
        Self {
            page: Some(page),
            notice: None,
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            page: None,
            notice: Some(notice),
        }
    }
}

/// Input to an action. Each action reads only the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPayload {
    /// Donor id, for `contact`.
    pub id: Option<i64>,
    /// Search text, for `search`.
    pub query: String,
    /// Route id, for `navigate`.
    pub route: String,
    /// Form fields, for `register`.
    pub registration: Registration,
}

/// The application.
pub struct App {
    config: Config,
    store: SharedStore,
    registry: Registry<SharedStore>,
    auth: AuthStore<SharedStore>,
    generator: DemoGenerator,
    route: Route,
    actions: HashMap<&'static str, Handler>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store.location())
            .field("donors", &self.registry.len())
            .field("route", &self.route)
            .field("actions", &self.action_names())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Start the application on `store`, seeding the registry if needed.
    pub fn new(config: Config, store: SharedStore) -> Self {
        let mut generator = DemoGenerator::from_config(&config.registry);
        let registry = Registry::open(
            Rc::clone(&store),
            &config.storage.donors_key,
            &config.registry,
            &mut generator,
        );
        let auth = AuthStore::from_config(Rc::clone(&store), &config.storage);

        Self {
            config,
            store,
            registry,
            auth,
            generator,
            route: Route::Home,
            actions: default_actions(),
        }
    }

    /// Run the action named `action`.
    ///
    /// Unknown actions are ignored and yield an empty outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler fails for a reason other than bad
    /// user input. Rejected input is reported as an error notice instead.
    pub fn dispatch(&mut self, action: &str, payload: &ActionPayload) -> Result<Outcome> {
        let Some(handler) = self.actions.get(action).copied() else {
            debug!(action, "Ignoring unknown action");
            return Ok(Outcome::default());
        };
        match handler(self, payload) {
            Err(e) if e.is_user_error() => Ok(Outcome::notice(Notice::error(e.to_string()))),
            other => other,
        }
    }

    /// Register or replace the handler for `action`.
    pub fn register_action(&mut self, action: &'static str, handler: Handler) {
        self.actions.insert(action, handler);
    }

    /// Names of the registered actions, sorted.
    #[must_use]
    pub fn action_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Switch to `route` and build its page.
    pub fn navigate(&mut self, route: Route) -> Page {
        self.route = route;
        debug!(%route, "Navigated");
        match route {
            Route::Home => Page::Donors(self.render_donors("")),
            Route::MapView => Page::Map(map::map_view(self.registry.donors())),
            Route::Dashboard => Page::Dashboard(chart::dashboard(self.registry.donors())),
            Route::Donate => Page::Donate,
        }
    }

    /// The current route.
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Donor cards matching `query`.
    #[must_use]
    pub fn render_donors(&self, query: &str) -> String {
        render::render_list(self.registry.donors(), query, View::Card)
    }

    /// The compact donor feed.
    #[must_use]
    pub fn render_feed(&self) -> String {
        render::render_feed(self.registry.donors(), self.config.registry.demo_target)
    }

    /// Apply a search saved by the find page, consuming it.
    ///
    /// Returns the query and the matching donor list, or `None` when no
    /// search was saved.
    pub fn apply_saved_search(&mut self) -> Option<(String, Page)> {
        let query = explore::take_saved_search(&self.store, &self.config.storage.filters_key)?;
        info!(%query, "Applying saved search");
        let page = Page::Donors(self.render_donors(&query));
        Some((query, page))
    }

    /// Number of pending donation requests.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        explore::pending_request_count(&self.store, &self.config.storage.requests_key)
    }

    /// Look a donor up by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DonorNotFound`] for unknown ids.
    pub fn donor(&self, id: i64) -> Result<&DonorRecord> {
        self.registry.find(id).ok_or(Error::DonorNotFound { id })
    }

    /// The donor registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<SharedStore> {
        &self.registry
    }

    /// Mutable access to the donor registry.
    pub fn registry_mut(&mut self) -> &mut Registry<SharedStore> {
        &mut self.registry
    }

    /// Account and session storage.
    #[must_use]
    pub fn auth(&self) -> &AuthStore<SharedStore> {
        &self.auth
    }

    /// The configuration the app was started with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

/// The built-in action table.
#[must_use]
pub fn default_actions() -> HashMap<&'static str, Handler> {
    let mut actions: HashMap<&'static str, Handler> = HashMap::new();
    actions.insert("contact", contact);
    actions.insert("search", search);
    actions.insert("register", register);
    actions.insert("navigate", navigate);
    actions
}

fn contact(app: &mut App, payload: &ActionPayload) -> Result<Outcome> {
    let name = payload
        .id
        .and_then(|id| app.registry.find(id))
        .and_then(|donor| donor.name.as_deref())
        .unwrap_or(UNKNOWN_CONTACT);
    info!(id = ?payload.id, "Contact requested");
    Ok(Outcome::notice(Notice::info(format!(
        "📨 Request sent to {name}"
    ))))
}

fn search(app: &mut App, payload: &ActionPayload) -> Result<Outcome> {
    Ok(Outcome::page(Page::Donors(
        app.render_donors(&payload.query),
    )))
}

fn register(app: &mut App, payload: &ActionPayload) -> Result<Outcome> {
    app.registry
        .register(&payload.registration, &mut app.generator)?;
    Ok(Outcome {
        page: Some(app.navigate(Route::Home)),
        notice: Some(Notice::success(REGISTERED)),
    })
}

fn navigate(app: &mut App, payload: &ActionPayload) -> Result<Outcome> {
    let route = Route::resolve(&payload.route);
    if route.id() != payload.route.trim() {
        debug!(requested = %payload.route, "Unknown route, showing home");
    }
    Ok(Outcome::page(app.navigate(route)))
}
