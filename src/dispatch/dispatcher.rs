//! Request → response mapping
//!
//! GET serves files from the route table. POST is accepted only on
//! POST-only routes, where the body is a login form. Unrecognized methods
//! are a bad request.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::assets::AssetSource;
use crate::dispatch::credentials::CredentialCheck;
use crate::dispatch::routes::RouteTable;
use crate::http::request::{Method, Request};
use crate::http::response::{LOGIN_SUCCESS_BODY, Response, ResponseBuilder, StatusCode};

pub struct Dispatcher {
    routes: RouteTable,
    assets: Arc<dyn AssetSource>,
    credentials: Arc<dyn CredentialCheck>,
}

impl Dispatcher {
    pub fn new(
        routes: RouteTable,
        assets: Arc<dyn AssetSource>,
        credentials: Arc<dyn CredentialCheck>,
    ) -> Self {
        Self {
            routes,
            assets,
            credentials,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Produces the response for `request`. Never fails: every problem maps
    /// to an error status.
    pub fn handle(&self, request: &Request) -> Response {
        match request.method() {
            Method::GET => self.handle_get(request),
            Method::POST => self.handle_post(request),
            Method::UNKNOWN(token) => {
                tracing::debug!(method = %token, path = request.path(), "Unsupported method");
                Response::bad_request(request.version())
            }
        }
    }

    fn handle_get(&self, request: &Request) -> Response {
        let version = request.version();

        let route = match self.routes.get(request.path()) {
            Some(route) if !route.post_only => route,
            _ => return Response::not_found(version),
        };

        match self.assets.load(&route.locator) {
            Ok(contents) => ResponseBuilder::new(StatusCode::Ok)
                .version(version)
                .header("Content-Type", route.file_type.mime())
                .body(contents)
                .build(),
            Err(e) => {
                tracing::warn!(
                    path = request.path(),
                    locator = %route.locator,
                    error = %e,
                    "Failed to open routed file"
                );
                Response::internal_error(version)
            }
        }
    }

    fn handle_post(&self, request: &Request) -> Response {
        let version = request.version();

        match self.routes.get(request.path()) {
            Some(route) if route.post_only => {}
            _ => return Response::not_found(version),
        }

        let form = parse_form(request.body());
        let (Some(login), Some(pass)) = (form.get("login"), form.get("pass")) else {
            return Response::bad_request(version);
        };

        if self.credentials.verify(login, pass) {
            tracing::debug!(login = %login, "Login accepted");
            Response::html(StatusCode::Ok, version, LOGIN_SUCCESS_BODY)
        } else {
            tracing::debug!(login = %login, "Login rejected");
            Response::forbidden(version)
        }
    }
}

/// Decodes an `application/x-www-form-urlencoded` body. A repeated key keeps
/// its last value.
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}
