//! Local development server.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tiny_http::{Header, Request, Response, Server};

use crate::error::{Error, Result};
use crate::pipeline::NOT_FOUND_PAGE;
use crate::portfolio::Portfolio;
use crate::routes::{self, Route};

/// Portfolio shared between the server and the rebuild watcher.
pub type SharedPortfolio = Arc<RwLock<Portfolio>>;

/// What to send back for a request.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Serve this file with status 200
    File(PathBuf),
    /// Serve the not-found page (or plain text if it was not built) with 404
    NotFound,
}

/// Decide how to answer `target`. Project routes go through the portfolio
/// lookup so unknown slugs get the not-found page even if a stale file exists.
pub fn resolve(target: &str, output_dir: &Path, portfolio: &Portfolio) -> Reply {
    let route = Route::parse(target);

    if let Route::Project(slug) = &route
        && !portfolio.lookup(slug).is_found()
    {
        tracing::debug!(%slug, "unknown project");
        return Reply::NotFound;
    }

    match routes::file_for(&route, output_dir) {
        Some(path) if path.is_file() => Reply::File(path),
        _ => Reply::NotFound,
    }
}

/// Serve `output_dir` on `port` until the process is stopped.
pub fn serve(output_dir: &Path, portfolio: SharedPortfolio, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let server =
        Server::http(&addr).map_err(|e| Error::Other(format!("failed to start server: {}", e)))?;

    tracing::info!(url = %format!("http://localhost:{}", port), "serving site");
    println!(
        "\n  Serving at http://localhost:{}\n  Press Ctrl+C to stop\n",
        port
    );

    for request in server.incoming_requests() {
        let target = request.url().to_string();

        let reply = {
            let portfolio = portfolio.read().unwrap_or_else(|e| e.into_inner());
            resolve(&target, output_dir, &portfolio)
        };

        if let Err(e) = respond(request, reply, output_dir, &target) {
            tracing::warn!(path = %target, error = %e, "failed to respond");
        }
    }

    Ok(())
}

fn respond(request: Request, reply: Reply, output_dir: &Path, target: &str) -> Result<()> {
    match reply {
        Reply::File(path) => {
            let content = fs::read(&path)?;
            let response =
                Response::from_data(content).with_header(header(routes::content_type(&path))?);
            request.respond(response)?;
            tracing::debug!(path = %target, "200 OK");
        }
        Reply::NotFound => {
            let page = output_dir.join(NOT_FOUND_PAGE);
            let response = match fs::read(&page) {
                Ok(content) => Response::from_data(content)
                    .with_status_code(404)
                    .with_header(header("text/html; charset=utf-8")?),
                Err(_) => Response::from_string("404 Not Found")
                    .with_status_code(404)
                    .with_header(header("text/plain; charset=utf-8")?),
            };
            request.respond(response)?;
            tracing::debug!(path = %target, "404 Not Found");
        }
    }

    Ok(())
}

fn header(content_type: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", content_type)
        .map_err(|()| Error::Other(format!("invalid content type: {}", content_type)))
}
