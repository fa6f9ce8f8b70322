//! The set of trusted Roughtime servers a chain may be built from or verified against

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use data_encoding::BASE64;
use notary_common::encoding::try_decode_key;
use notary_protocol::tags::PublicKey;
use serde::{Deserialize, Serialize};

/// Used when no external directory is supplied. Kept byte-compatible with the listing the
/// deployed servers publish.
pub const DEFAULT_SERVERS: &str = r#"{
	"servers": [
		{
			"name": "Google",
			"publicKeyType": "ed25519",
			"publicKey": "etPaaIxcBMY1oUeGpwvPMCJMwlRVNxv51KK/tktoJTQ=",
			"addresses": [
				{
					"protocol": "udp",
					"address": "roughtime.sandbox.google.com:2002"
				}
			]
		},
		{
			"name": "Cloudflare",
			"publicKeyType": "ed25519",
			"publicKey": "gD63hSj3ScS+wuOeGrubXlq35N1c5Lby/S+T7MNTjxo=",
			"addresses": [
				{
					"protocol": "udp",
					"address": "roughtime.cloudflare.com:2002"
				}
			]
		}
	]
}"#;

/// Directory failures. Everything except `UnknownServer` is a configuration error raised
/// while loading.
#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("field '{field}' is empty")]
    EmptyField { field: String },

    #[error("server '{server}': unsupported publicKeyType '{key_type}'")]
    UnsupportedKeyType { server: String, key_type: String },

    #[error("server '{server}': invalid public key: {reason}")]
    InvalidKey { server: String, reason: String },

    #[error("duplicate server name '{0}'")]
    DuplicateServer(String),

    #[error("invalid address: expected 'host:port', got '{address}'")]
    InvalidAddress { address: String },

    #[error("JSON error: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("unknown server '{0}'")]
    UnknownServer(String),
}

impl DirectoryError {
    /// True for every failure that means the directory source itself is unusable.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, DirectoryError::UnknownServer(_))
    }
}

/// Signature scheme of a server's long-term key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Ed25519,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// Transport protocol named by an address entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Udp,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => f.write_str("udp"),
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

/// A network address for a Roughtime server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    protocol: Protocol,

    /// Host and port in the format "host:port"
    address: String,
}

impl Address {
    pub fn new(protocol: Protocol, address: &str) -> Result<Self, DirectoryError> {
        let addr = Self {
            protocol,
            address: address.to_string(),
        };
        addr.validate()?;
        Ok(addr)
    }

    pub fn udp(address: &str) -> Result<Self, DirectoryError> {
        Self::new(Protocol::Udp, address)
    }

    fn validate(&self) -> Result<(), DirectoryError> {
        // rsplit so bracketed IPv6 literals keep their inner colons
        match self.address.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
            _ => Err(DirectoryError::InvalidAddress {
                address: self.address.clone(),
            }),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.address)
    }
}

/// A trusted server: its name, long-term public key, and where to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    name: String,
    key_type: KeyType,
    public_key: PublicKey,
    addresses: Vec<Address>,
}

impl Server {
    pub fn new(
        name: &str,
        public_key: PublicKey,
        addresses: Vec<Address>,
    ) -> Result<Self, DirectoryError> {
        if name.is_empty() {
            return Err(DirectoryError::EmptyField {
                field: "name".to_string(),
            });
        }

        if addresses.is_empty() {
            return Err(DirectoryError::EmptyField {
                field: format!("{name}.addresses"),
            });
        }

        Ok(Self {
            name: name.to_string(),
            key_type: KeyType::Ed25519,
            public_key,
            addresses,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }
}

/// On-disk shape of a directory document
#[derive(Debug, Serialize, Deserialize)]
struct DirectoryDocument {
    servers: Vec<ServerEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServerEntry {
    name: String,

    #[serde(rename = "publicKeyType")]
    public_key_type: String,

    #[serde(rename = "publicKey")]
    public_key: String,

    addresses: Vec<Address>,
}

impl TryFrom<ServerEntry> for Server {
    type Error = DirectoryError;

    fn try_from(entry: ServerEntry) -> Result<Self, Self::Error> {
        if entry.name.is_empty() {
            return Err(DirectoryError::EmptyField {
                field: "name".to_string(),
            });
        }

        if entry.public_key_type != "ed25519" {
            return Err(DirectoryError::UnsupportedKeyType {
                server: entry.name,
                key_type: entry.public_key_type,
            });
        }

        if entry.public_key.is_empty() {
            return Err(DirectoryError::EmptyField {
                field: format!("{}.publicKey", entry.name),
            });
        }

        let public_key =
            try_decode_key(&entry.public_key).map_err(|e| DirectoryError::InvalidKey {
                server: entry.name.clone(),
                reason: e.to_string(),
            })?;

        for address in &entry.addresses {
            address.validate()?;
        }

        Server::new(&entry.name, public_key, entry.addresses)
    }
}

impl From<&Server> for ServerEntry {
    fn from(server: &Server) -> Self {
        ServerEntry {
            name: server.name.clone(),
            public_key_type: server.key_type.to_string(),
            public_key: BASE64.encode(server.public_key.as_ref()),
            addresses: server.addresses.clone(),
        }
    }
}

/// Immutable name-to-server mapping, preserving the order servers were listed in.
#[derive(Debug, Clone)]
pub struct ServerDirectory {
    servers: Vec<Server>,
    by_name: HashMap<String, usize>,
}

impl ServerDirectory {
    /// Build a directory from already-validated servers. Names must be unique.
    pub fn new(servers: Vec<Server>) -> Result<Self, DirectoryError> {
        if servers.is_empty() {
            return Err(DirectoryError::EmptyField {
                field: "servers".to_string(),
            });
        }

        let mut by_name = HashMap::with_capacity(servers.len());
        for (idx, server) in servers.iter().enumerate() {
            if by_name.insert(server.name.clone(), idx).is_some() {
                return Err(DirectoryError::DuplicateServer(server.name.clone()));
            }
        }

        Ok(Self { servers, by_name })
    }

    /// The directory used when no external source is supplied.
    pub fn builtin() -> Self {
        Self::from_json(DEFAULT_SERVERS).expect("built-in server directory is valid")
    }

    /// Parse and validate a directory document
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let document: DirectoryDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Read and validate a directory document from `reader`
    pub fn load<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let document: DirectoryDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let file = std::fs::File::open(path)?;
        Self::load(std::io::BufReader::new(file))
    }

    fn from_document(document: DirectoryDocument) -> Result<Self, DirectoryError> {
        let servers = document
            .servers
            .into_iter()
            .map(Server::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(servers)
    }

    pub fn lookup(&self, name: &str) -> Result<&Server, DirectoryError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.servers[idx])
            .ok_or_else(|| DirectoryError::UnknownServer(name.to_string()))
    }

    /// The named servers, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Server>, DirectoryError> {
        names
            .iter()
            .map(|name| self.lookup(name.as_ref()).cloned())
            .collect()
    }

    /// All servers in listed order
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn to_json(&self) -> Result<String, DirectoryError> {
        let document = DirectoryDocument {
            servers: self.servers.iter().map(ServerEntry::from).collect(),
        };
        serde_json::to_string_pretty(&document).map_err(Into::into)
    }
}

impl Default for ServerDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}
