//! Turning interface and phy names into kernel indices.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ResolveError;

/// Resolves the identifier of a command.
pub trait IdentifierResolver {
    /// Return the interface index of a network device.
    fn interface_index(&self, name: &str) -> Result<u32, ResolveError>;

    /// Return the index of a wpan phy.
    fn phy_index(&self, name: &str) -> Result<u32, ResolveError>;
}

/// Reads indices from sysfs.
///
/// Phys may also be given as `phy#<index>`, the form the kernel prints in
/// dumps.
#[derive(Debug, Clone)]
pub struct SysfsResolver {
    root: PathBuf,
}

impl Default for SysfsResolver {
    fn default() -> Self {
        Self::new("/sys/class")
    }
}

impl SysfsResolver {
    /// Resolve below `root` instead of `/sys/class`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_index(path: &Path) -> Result<u32, ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = content
            .trim()
            .parse()
            .map_err(|_| ResolveError::MalformedIndex(path.to_path_buf()))?;
        debug!("{} holds index {index}", path.display());
        Ok(index)
    }

    fn valid_name(name: &str) -> bool {
        !name.is_empty() && name != "." && name != ".." && !name.contains('/')
    }
}

impl IdentifierResolver for SysfsResolver {
    fn interface_index(&self, name: &str) -> Result<u32, ResolveError> {
        if !Self::valid_name(name) {
            return Err(ResolveError::UnknownInterface(name.to_string()));
        }

        let path = self.root.join("net").join(name).join("ifindex");
        if !path.exists() {
            return Err(ResolveError::UnknownInterface(name.to_string()));
        }
        Self::read_index(&path)
    }

    fn phy_index(&self, name: &str) -> Result<u32, ResolveError> {
        if let Some(index) = name.strip_prefix("phy#") {
            return index
                .parse()
                .map_err(|_| ResolveError::UnknownPhy(name.to_string()));
        }

        if !Self::valid_name(name) {
            return Err(ResolveError::UnknownPhy(name.to_string()));
        }

        let path = self.root.join("ieee802154").join(name).join("index");
        if !path.exists() {
            return Err(ResolveError::UnknownPhy(name.to_string()));
        }
        Self::read_index(&path)
    }
}

/// Resolves from fixed tables.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    interfaces: HashMap<String, u32>,
    phys: HashMap<String, u32>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, name: impl Into<String>, index: u32) -> Self {
        self.interfaces.insert(name.into(), index);
        self
    }

    pub fn with_phy(mut self, name: impl Into<String>, index: u32) -> Self {
        self.phys.insert(name.into(), index);
        self
    }
}

impl IdentifierResolver for StaticResolver {
    fn interface_index(&self, name: &str) -> Result<u32, ResolveError> {
        self.interfaces
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownInterface(name.to_string()))
    }

    fn phy_index(&self, name: &str) -> Result<u32, ResolveError> {
        self.phys
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownPhy(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sysfs() -> (PathBuf, SysfsResolver) {
        let root = std::env::temp_dir().join(format!("wpanctl-sysfs-{}", std::process::id()));
        std::fs::create_dir_all(root.join("net/wpan0")).unwrap();
        std::fs::create_dir_all(root.join("net/broken")).unwrap();
        std::fs::create_dir_all(root.join("ieee802154/phy1")).unwrap();
        std::fs::write(root.join("net/wpan0/ifindex"), "7\n").unwrap();
        std::fs::write(root.join("net/broken/ifindex"), "seven\n").unwrap();
        std::fs::write(root.join("ieee802154/phy1/index"), "1\n").unwrap();
        (root.clone(), SysfsResolver::new(root))
    }

    #[test]
    fn sysfs_lookup() {
        let (root, resolver) = sysfs();
        assert_eq!(resolver.interface_index("wpan0").unwrap(), 7);
        assert_eq!(resolver.phy_index("phy1").unwrap(), 1);
        assert_eq!(resolver.phy_index("phy#4").unwrap(), 4);
        assert!(matches!(
            resolver.interface_index("wpan9"),
            Err(ResolveError::UnknownInterface(_))
        ));
        assert!(matches!(
            resolver.interface_index("../net/wpan0"),
            Err(ResolveError::UnknownInterface(_))
        ));
        assert!(matches!(
            resolver.interface_index("broken"),
            Err(ResolveError::MalformedIndex(_))
        ));
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn static_lookup() {
        let resolver = StaticResolver::new()
            .with_interface("wpan0", 3)
            .with_phy("phy0", 0);
        assert_eq!(resolver.interface_index("wpan0").unwrap(), 3);
        assert!(matches!(
            resolver.phy_index("phy1"),
            Err(ResolveError::UnknownPhy(_))
        ));
    }
}
