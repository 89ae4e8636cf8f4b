//! Configuration of sessions built from a list of hosts.

use std::env;
use std::time::Duration;

use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session_builder::SessionBuilder;
use scylla::client::Compression;
use scylla::statement::Consistency;
use tracing::debug;

use crate::errors::Error;
use crate::session::DriverSession;

/// Environment variable read by [`ClusterConfig::from_env`].
pub const HOSTS_ENV: &str = "SCYLLA_URI";

const DEFAULT_HOST: &str = "127.0.0.1:9042";

/// Settings of a session connecting to a list of hosts.
///
/// Anything left unset keeps the driver's default.
///
/// # Example
/// ```rust
/// # use std::error::Error;
/// # async fn check_only_compiles() -> Result<(), Box<dyn Error>> {
/// use mockable_cql::{ClusterConfig, Session};
/// use scylla::statement::Consistency;
/// use std::time::Duration;
///
/// let session = ClusterConfig::new(["127.0.0.1:9042", "127.0.0.2:9042"])
///     .keyspace("ks")
///     .consistency(Consistency::Quorum)
///     .connection_timeout(Duration::from_secs(5))
///     .connect()
///     .await?;
/// let tables = session.tables("ks")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClusterConfig {
    hosts: Vec<String>,
    keyspace: Option<String>,
    credentials: Option<(String, String)>,
    connection_timeout: Option<Duration>,
    consistency: Option<Consistency>,
    request_timeout: Option<Duration>,
    compression: Option<Compression>,
}

impl ClusterConfig {
    /// Creates a configuration for the given contact points (`host:port`).
    pub fn new(hosts: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .map(|host| host.as_ref().to_owned())
                .collect(),
            ..Default::default()
        }
    }

    /// Creates a configuration from the comma-separated hosts in
    /// the `SCYLLA_URI` environment variable, defaulting to `127.0.0.1:9042`.
    pub fn from_env() -> Self {
        let hosts = env::var(HOSTS_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_owned());
        Self::new(parse_hosts(&hosts))
    }

    /// Contact points of the cluster.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Keyspace used by statements that don't name one. It is case sensitive.
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Credentials for plain text authentication.
    pub fn user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Timeout of establishing a connection to a node.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Default consistency of statements.
    pub fn consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    /// Default deadline of requests.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Compression of the frames exchanged with the cluster.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    fn session_builder(&self) -> SessionBuilder {
        let mut builder = SessionBuilder::new()
            .known_nodes(&self.hosts)
            .compression(self.compression);

        if let Some(keyspace) = &self.keyspace {
            builder = builder.use_keyspace(keyspace, true);
        }
        if let Some((username, password)) = &self.credentials {
            builder = builder.user(username, password);
        }
        if let Some(timeout) = self.connection_timeout {
            builder = builder.connection_timeout(timeout);
        }
        if self.consistency.is_some() || self.request_timeout.is_some() {
            let mut profile = ExecutionProfile::builder();
            if let Some(consistency) = self.consistency {
                profile = profile.consistency(consistency);
            }
            if let Some(timeout) = self.request_timeout {
                profile = profile.request_timeout(Some(timeout));
            }
            builder = builder.default_execution_profile_handle(profile.build().into_handle());
        }
        builder
    }

    /// Connects to the cluster.
    pub async fn connect(self) -> Result<DriverSession, Error> {
        debug!(hosts = ?self.hosts, "Connecting to cluster");
        let session = self.session_builder().build().await?;
        debug!("Connected");
        Ok(DriverSession::new(session))
    }
}

fn parse_hosts(hosts: &str) -> Vec<&str> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .collect()
}
