//! Final config assembly.
//!
//! # Responsibilities
//! - Turn compiled server blocks into the HTTP app config
//! - Derive listener addresses from site keys and `bind` hosts
//! - Serialize the whole thing into the blob handed to the restart controller

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::compiler::{Compiled, CompiledServer};
use crate::directives::{Options, Route};

const DEFAULT_HTTP_PORT: u16 = 80;
const DEFAULT_HTTPS_PORT: u16 = 443;

/// Root of the assembled configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub apps: Apps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apps {
    pub http: HttpApp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpApp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<u16>,

    pub servers: BTreeMap<String, HttpServer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpServer {
    pub listen: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

/// Port option, if present and a valid port number.
fn port_option(options: &Options, name: &str) -> Option<u16> {
    options
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|port| u16::try_from(port).ok())
}

#[derive(Debug, Clone, Copy)]
struct Ports {
    http: u16,
    https: u16,
}

/// Port a site key listens on: explicit port, else the scheme's default.
fn key_port(key: &str, ports: Ports) -> u16 {
    let (is_http, rest) = match key.strip_prefix("http://") {
        Some(rest) => (true, rest),
        None => (false, key.strip_prefix("https://").unwrap_or(key)),
    };
    let host_port = rest.split('/').next().unwrap_or(rest);
    let explicit = host_port
        .rsplit_once(':')
        // unbracketed IPv6 hosts carry no port
        .filter(|(host, _)| !host.contains(':') || host.starts_with('['))
        .and_then(|(_, port)| port.parse::<u16>().ok());

    match explicit {
        Some(port) => port,
        None if is_http => ports.http,
        None => ports.https,
    }
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn listen_addresses(server: &CompiledServer, ports: Ports) -> Vec<String> {
    let mut listen: Vec<String> = Vec::new();
    let mut push = |addr: String| {
        if !listen.contains(&addr) {
            listen.push(addr);
        }
    };
    for key in &server.keys {
        let port = key_port(key, ports);
        if server.bind_hosts.is_empty() {
            push(format!(":{port}"));
        } else {
            for host in &server.bind_hosts {
                push(join_host_port(host, port));
            }
        }
    }
    listen
}

impl Compiled {
    /// Assemble the app config from every compiled server block.
    pub fn to_config(&self) -> AppConfig {
        let http_port = port_option(&self.options, "http_port");
        let https_port = port_option(&self.options, "https_port");
        let ports = Ports {
            http: http_port.unwrap_or(DEFAULT_HTTP_PORT),
            https: https_port.unwrap_or(DEFAULT_HTTPS_PORT),
        };

        let servers = self
            .servers
            .iter()
            .enumerate()
            .map(|(i, server)| {
                (
                    format!("srv{i}"),
                    HttpServer {
                        listen: listen_addresses(server, ports),
                        routes: server.routes.clone(),
                    },
                )
            })
            .collect();

        AppConfig {
            apps: Apps {
                http: HttpApp {
                    http_port,
                    https_port,
                    servers,
                },
            },
        }
    }

    /// Serialized config, ready for the restart controller.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.to_config())
    }
}
