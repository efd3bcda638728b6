//! Network access for the cache worker.

use super::{Request, Response};
use crate::{Error, Result};
use std::io::Read;

/// Performs a request against the network.
///
/// Any HTTP status is a successful fetch; only transport failures
/// (DNS, refused connection, broken stream) are errors.
pub trait Network {
    fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Blocking `ureq` network.
pub struct HttpNetwork {
    agent: ureq::Agent,
}

impl HttpNetwork {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("hubdeck/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Network for HttpNetwork {
    fn fetch(&self, request: &Request) -> Result<Response> {
        let resp = match self.agent.get(&request.url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => return Err(Error::Offline(t.to_string())),
        };

        let status = resp.status();
        let headers = resp
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = resp.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();
        let mut body = Vec::new();
        resp.into_reader()
            .read_to_end(&mut body)
            .map_err(|e| Error::Offline(e.to_string()))?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
