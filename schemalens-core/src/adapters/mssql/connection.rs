//! SQL Server connection resource.
//!
//! Tiberius has no pool of its own here: the adapter owns a single client
//! that is established on first use and re-established after a transport
//! failure.
//!
//! Recognized driver properties:
//! - `encrypt`: `true`/`required`, `false`/`off`, `not_supported`
//! - `trust_server_certificate` (alias `trustServerCertificate`): `true`
//!   accepts any server certificate
//! - `instance_name` (alias `instanceName`): resolve the port through
//!   SQL Browser
//! - `application_name` (alias `applicationName`)

use super::ConnectionConfig;
use crate::Result;
use crate::error::ExtractorError;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

pub(crate) type SqlServerClient = Client<Compat<TcpStream>>;

/// Connection parameters resolved once, reused for every (re)connect.
#[derive(Clone)]
pub(crate) struct SqlServerConnector {
    config: Config,
    address: String,
    use_browser: bool,
    connect_timeout: std::time::Duration,
}

impl std::fmt::Debug for SqlServerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerConnector")
            .field("address", &self.address)
            .field("use_browser", &self.use_browser)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl SqlServerConnector {
    /// Builds the tiberius configuration from the connection configuration.
    ///
    /// # Errors
    /// Returns a configuration error for unrecognized property values
    pub(crate) fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let mut tiberius_config = Config::new();
        tiberius_config.host(&config.host);
        tiberius_config.port(config.port);
        tiberius_config.database(&config.database);
        tiberius_config.authentication(AuthMethod::sql_server(
            &config.username,
            config.password(),
        ));
        tiberius_config.application_name(
            config
                .properties
                .get_any(&["application_name", "applicationName"])
                .unwrap_or(concat!("schemalens-", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(encrypt) = config.properties.get_any(&["encrypt"]) {
            tiberius_config.encryption(parse_encryption_level(encrypt)?);
        }

        if let Some(trust) = config
            .properties
            .get_any(&["trust_server_certificate", "trustServerCertificate"])
            && parse_flag("trust_server_certificate", trust)?
        {
            tiberius_config.trust_cert();
        }

        let instance_name = config
            .properties
            .get_any(&["instance_name", "instanceName"]);
        if let Some(instance_name) = instance_name {
            tiberius_config.instance_name(instance_name);
        }

        for (key, _) in config.properties.iter() {
            if !is_recognized_property(key) {
                tracing::debug!("Ignoring unrecognized SQL Server property '{}'", key);
            }
        }

        Ok(Self {
            config: tiberius_config,
            address: format!("{}:{}", config.host, config.port),
            use_browser: instance_name.is_some(),
            connect_timeout: config.connect_timeout,
        })
    }

    /// Opens a new client within the configured timeout.
    ///
    /// # Errors
    /// Returns a connection error if the server is unreachable, the login is
    /// rejected or the timeout elapses
    pub(crate) async fn connect(&self) -> Result<SqlServerClient> {
        let config = self.config.clone();
        let use_browser = self.use_browser;

        let attempt = async move {
            let tcp = if use_browser {
                TcpStream::connect_named(&config).await?
            } else {
                TcpStream::connect(config.get_addr()).await?
            };
            tcp.set_nodelay(true)?;
            Client::connect(config, tcp.compat_write()).await
        };

        match tokio::time::timeout(self.connect_timeout, attempt).await {
            Ok(Ok(client)) => {
                tracing::debug!("Connected to SQL Server at {}", self.address);
                Ok(client)
            }
            Ok(Err(e)) => Err(ExtractorError::connection_failed(
                format!("Failed to connect to SQL Server at {}", self.address),
                e,
            )),
            Err(elapsed) => Err(ExtractorError::connection_failed(
                format!(
                    "Timed out after {:?} connecting to SQL Server at {}",
                    self.connect_timeout, self.address
                ),
                elapsed,
            )),
        }
    }
}

fn parse_encryption_level(value: &str) -> Result<EncryptionLevel> {
    match value.trim().to_lowercase().as_str() {
        "true" | "required" | "yes" => Ok(EncryptionLevel::Required),
        "false" | "off" | "no" => Ok(EncryptionLevel::Off),
        "not_supported" | "notsupported" => Ok(EncryptionLevel::NotSupported),
        other => Err(ExtractorError::configuration(format!(
            "Invalid value '{}' for SQL Server property 'encrypt'",
            other
        ))),
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(ExtractorError::configuration(format!(
            "Invalid boolean '{}' for SQL Server property '{}'",
            other, name
        ))),
    }
}

fn is_recognized_property(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "encrypt"
            | "trust_server_certificate"
            | "trustservercertificate"
            | "instance_name"
            | "instancename"
            | "application_name"
            | "applicationname"
    )
}
