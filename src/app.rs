//! Root application component with routing and context providers.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::components::conditional_route::ConditionalRoute;
use crate::components::restricted_route::RestrictedRoute;
use crate::config::ClientConfig;
use crate::net::gateway::SessionGateway;
use crate::net::http::BrowserTransport;
use crate::pages::{
    error::ErrorPage, home::HomePage, landing::LandingPage, login::LoginPage, logout::LogoutPage,
    not_found::NotFoundPage, settings::UserSettingsPage, signup::SignUpPage,
};
use crate::state::auth::AuthCache;
use crate::util::auth::provide_auth_cache;
use crate::util::guard::RouteGuard;
use crate::util::runtime::{LeptosSpawner, SystemClock};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

fn load_config() -> ClientConfig {
    ClientConfig::from_build_env().unwrap_or_else(|e| {
        log::warn!("invalid build configuration, using defaults: {e}");
        ClientConfig::default()
    })
}

/// Root application component.
///
/// Builds the one session cache for the page, provides it and the client
/// config through context, and wraps each route in its access guard.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = load_config();
    let transport = Rc::new(BrowserTransport::new(config.api_base_url.clone()));
    let cache = AuthCache::new(SessionGateway::new(transport), Rc::new(LeptosSpawner), Rc::new(SystemClock));
    provide_auth_cache(cache);
    provide_context(config.clone());

    let guest_only = RouteGuard::guest_only(config.home_path.clone()).with_error_redirect(config.error_path.clone());
    let members_only =
        RouteGuard::authenticated_only(config.login_path.clone()).with_error_redirect(config.error_path.clone());
    let login_guard = guest_only.clone();
    let signup_guard = guest_only;

    view! {
        <Stylesheet id="leptos" href="/pkg/status-client.css"/>
        <Title text="Status Tracker"/>

        <Router>
            <Routes fallback=|| view! { <NotFoundPage/> }>
                <Route
                    path=path!("/")
                    view=|| view! { <ConditionalRoute authenticated=|| view! { <HomePage/> } guest=|| view! { <LandingPage/> }/> }
                />
                <Route
                    path=path!("/login")
                    view=move || view! { <RestrictedRoute guard=login_guard.clone()><LoginPage/></RestrictedRoute> }
                />
                <Route
                    path=path!("/signup")
                    view=move || view! { <RestrictedRoute guard=signup_guard.clone()><SignUpPage/></RestrictedRoute> }
                />
                <Route
                    path=path!("/settings")
                    view=move || view! { <RestrictedRoute guard=members_only.clone()><UserSettingsPage/></RestrictedRoute> }
                />
                <Route path=path!("/logout") view=LogoutPage/>
                <Route path=path!("/error") view=ErrorPage/>
            </Routes>
        </Router>
    }
}
