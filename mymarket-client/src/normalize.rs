//! Turns parsed manifests into [`PackageDescriptor`]s and keeps resolved
//! lists free of duplicates.

use std::collections::HashSet;
use std::path::Path;

use base64::Engine as _;

use crate::archive::{DEFAULT_README_ENTRY, PACKAGE_JSON_ENTRY, PackageArchive, VSIX_MANIFEST_ENTRY};
use crate::descriptor::{Icon, PackageDescriptor, PackageOrigin, Readme};
use crate::error::{PkgError, Result};
use crate::manifest::{self, ExtensionManifest, TARGET_ANY};
use crate::resolve::remote::{CatalogEntry, CatalogExtension};
use crate::url::{is_http, join_url};

/// Read both manifests out of an open archive and build its descriptor.
pub fn describe_archive(archive: &mut PackageArchive, source_dir: &Path) -> Result<PackageDescriptor> {
    let origin = archive.path().display().to_string();

    let json_text = archive.read_text(PACKAGE_JSON_ENTRY).map_err(|e| match e {
        PkgError::EntryNotFound { entry, .. } => {
            PkgError::malformed(&origin, format!("archive has no `{entry}`"))
        }
        other => other,
    })?;
    let json = manifest::parse_package_json(&origin, &json_text)?;

    let xml = if archive.has_entry(VSIX_MANIFEST_ENTRY) {
        let text = archive.read_text(VSIX_MANIFEST_ENTRY)?;
        Some(manifest::parse_vsix_manifest(&origin, &text)?)
    } else {
        None
    };

    let manifest = ExtensionManifest::from_parts(&origin, json, xml.as_ref())?;
    let readme = read_readme(archive, &manifest);
    let icon = read_icon(archive, &manifest);

    Ok(PackageDescriptor {
        identifier: manifest.identifier(),
        version: manifest.version,
        target: manifest.target,
        display_name: manifest.display_name,
        description: manifest.description,
        origin: PackageOrigin::Directory(source_dir.to_path_buf()),
        location: origin,
        readme,
        icon,
        is_pre_release: manifest.is_pre_release,
        is_preview: manifest.is_preview,
    })
}

fn read_readme(archive: &mut PackageArchive, manifest: &ExtensionManifest) -> Readme {
    let entry = manifest
        .readme_entry
        .as_deref()
        .unwrap_or(DEFAULT_README_ENTRY);

    match archive.read_text(entry) {
        Ok(text) => Readme::Inline(text),
        Err(err) => {
            tracing::debug!("{}: no readme ({err})", manifest.identifier());
            Readme::Inline(String::new())
        }
    }
}

fn read_icon(archive: &mut PackageArchive, manifest: &ExtensionManifest) -> Icon {
    let Some(entry) = manifest.icon_entry.as_deref() else {
        return Icon::Placeholder;
    };

    match archive.read_binary(entry) {
        Ok(bytes) if !bytes.is_empty() => Icon::DataUri(data_uri(entry, &bytes)),
        Ok(_) => Icon::Placeholder,
        Err(err) => {
            tracing::debug!("{}: declared icon unreadable ({err})", manifest.identifier());
            Icon::Placeholder
        }
    }
}

pub fn data_uri(entry: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{encoded}", image_mime(entry))
}

fn image_mime(entry: &str) -> &'static str {
    let ext = Path::new(entry)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Build a descriptor from one catalog record. Records without any extension
/// entry cannot be installed and yield `None`.
pub fn describe_catalog_entry(base_url: &str, entry: &CatalogEntry) -> Option<PackageDescriptor> {
    let main: &CatalogExtension = entry.extensions.first()?;

    let icon = match main.icon_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => Icon::Url(join_url(base_url, path)),
        _ => Icon::Placeholder,
    };
    let display_name = main
        .display_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| main.name.clone())
        .unwrap_or_else(|| entry.identifier.clone());
    let target = main
        .target
        .clone()
        .filter(|target| !target.trim().is_empty())
        .unwrap_or_else(|| TARGET_ANY.to_string());

    Some(PackageDescriptor {
        identifier: entry.identifier.clone(),
        version: entry.version.clone(),
        target,
        display_name,
        description: main.description.clone().unwrap_or_default(),
        origin: PackageOrigin::Remote {
            base_url: base_url.to_string(),
        },
        location: catalog_location(base_url, main.location.as_deref()),
        readme: Readme::Remote(main.readme_path.clone().unwrap_or_default()),
        icon,
        is_pre_release: main.is_pre_release,
        is_preview: main.preview,
    })
}

/// Artifact location of a catalog package. Relative paths are served by the
/// catalog itself.
fn catalog_location(base_url: &str, location: Option<&str>) -> String {
    match location.map(str::trim) {
        None | Some("") => String::new(),
        Some(location) if is_http(location) || location.starts_with("file://") => location.to_string(),
        Some(location) => join_url(base_url, location),
    }
}

/// Ordered collection that drops descriptors whose
/// `(identifier, version, target)` was already collected.
#[derive(Debug, Default)]
pub struct DescriptorSet {
    seen: HashSet<(String, String, String)>,
    items: Vec<PackageDescriptor>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the descriptor was a duplicate and got dropped.
    pub fn insert(&mut self, descriptor: PackageDescriptor) -> bool {
        if !self.seen.insert(descriptor.dedup_key()) {
            tracing::debug!(
                "skipping duplicate {} from {}",
                descriptor,
                descriptor.location
            );
            return false;
        }
        self.items.push(descriptor);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<PackageDescriptor> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use zip::write::SimpleFileOptions;

    fn build_vsix(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    const XML_WITH_ASSETS: &str = r#"<PackageManifest Version="2.0.0">
  <Metadata>
    <Identity Id="tool" Version="1.2.0" Publisher="acme" TargetPlatform="win32-x64"/>
    <DisplayName>Acme Tool</DisplayName>
    <Description>Sharpens things</Description>
  </Metadata>
  <Assets>
    <Asset Type="Microsoft.VisualStudio.Services.Content.Details" Path="extension/docs/GUIDE.md" />
    <Asset Type="Microsoft.VisualStudio.Services.Icons.Default" Path="extension/icon.png" />
  </Assets>
</PackageManifest>"#;

    #[test]
    fn plain_archive_uses_placeholder_icon() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tool.vsix");
        build_vsix(
            &path,
            &[
                (PACKAGE_JSON_ENTRY, br#"{"publisher":"acme","name":"tool","version":"1.2.0"}"#),
                (DEFAULT_README_ENTRY, b"# Tool"),
            ],
        );

        let mut archive = PackageArchive::open(&path).unwrap();
        let d = describe_archive(&mut archive, tmp.path()).unwrap();

        assert_eq!(d.identifier, "acme.tool");
        assert_eq!(d.version, "1.2.0");
        assert_eq!(d.target, "any");
        assert_eq!(d.icon, Icon::Placeholder);
        assert!(!d.icon.src().is_empty());
        assert_eq!(d.readme, Readme::Inline("# Tool".to_string()));
        assert_eq!(d.location, path.display().to_string());
        assert_eq!(d.origin, PackageOrigin::Directory(tmp.path().to_path_buf()));
    }

    #[test]
    fn rich_archive_reads_declared_readme_and_icon() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tool.vsix");
        build_vsix(
            &path,
            &[
                (PACKAGE_JSON_ENTRY, br#"{"publisher":"acme","name":"tool","version":"1.2.0"}"#),
                (VSIX_MANIFEST_ENTRY, XML_WITH_ASSETS.as_bytes()),
                ("extension/docs/GUIDE.md", b"guide text"),
                ("extension/icon.png", &[1, 2, 3]),
            ],
        );

        let mut archive = PackageArchive::open(&path).unwrap();
        let d = describe_archive(&mut archive, tmp.path()).unwrap();

        assert_eq!(d.display_name, "Acme Tool");
        assert_eq!(d.target, "win32-x64");
        assert_eq!(d.readme, Readme::Inline("guide text".to_string()));
        assert_eq!(d.icon, Icon::DataUri("data:image/png;base64,AQID".to_string()));
    }

    #[test]
    fn declared_but_missing_icon_falls_back_to_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tool.vsix");
        build_vsix(
            &path,
            &[
                (PACKAGE_JSON_ENTRY, br#"{"publisher":"acme","name":"tool","version":"1.2.0","icon":"logo.png"}"#),
            ],
        );

        let mut archive = PackageArchive::open(&path).unwrap();
        let d = describe_archive(&mut archive, tmp.path()).unwrap();
        assert_eq!(d.icon, Icon::Placeholder);
        assert_eq!(d.readme, Readme::Inline(String::new()));
    }

    #[test]
    fn archive_without_package_json_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.vsix");
        build_vsix(&path, &[("extension/README.md", b"hi")]);

        let mut archive = PackageArchive::open(&path).unwrap();
        assert!(matches!(
            describe_archive(&mut archive, tmp.path()),
            Err(PkgError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn catalog_entry_icon_is_joined_to_base_url() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{
                "identifier": "acme.tool",
                "version": "2.0.0",
                "extensions": [{
                    "displayName": "Acme Tool",
                    "location": "https://m.example.com/dl/acme.tool-2.0.0.vsix",
                    "iconPath": "assets/acme.tool/icon.png",
                    "readmePath": "assets/acme.tool/README.md",
                    "isPreRelease": true
                }]
            }"#,
        )
        .unwrap();

        let d = describe_catalog_entry("https://m.example.com/", &entry).unwrap();
        assert_eq!(d.icon, Icon::Url("https://m.example.com/assets/acme.tool/icon.png".to_string()));
        assert_eq!(d.readme, Readme::Remote("assets/acme.tool/README.md".to_string()));
        assert_eq!(d.target, "any");
        assert!(d.is_pre_release);
        assert_eq!(d.source_label(), "");
    }

    #[test]
    fn relative_catalog_location_is_served_by_the_catalog() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"identifier":"acme.tool","version":"2.0.0",
                "extensions":[{"location":"/dl/acme.tool-2.0.0.vsix"}]}"#,
        )
        .unwrap();

        let d = describe_catalog_entry("https://m.example.com//", &entry).unwrap();
        assert_eq!(d.location, "https://m.example.com/dl/acme.tool-2.0.0.vsix");

        assert_eq!(catalog_location("https://m.example.com", None), "");
        assert_eq!(
            catalog_location("https://m.example.com", Some("https://cdn.example.com/x.vsix")),
            "https://cdn.example.com/x.vsix"
        );
    }

    #[test]
    fn catalog_entry_without_extensions_is_skipped() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"identifier":"acme.tool","version":"1.0.0","extensions":[]}"#).unwrap();
        assert!(describe_catalog_entry("https://m.example.com", &entry).is_none());
    }

    #[test]
    fn descriptor_set_drops_duplicate_triples() {
        let base = PackageDescriptor {
            identifier: "acme.tool".to_string(),
            version: "1.0.0".to_string(),
            target: "any".to_string(),
            display_name: "Tool".to_string(),
            description: String::new(),
            origin: PackageOrigin::Directory(PathBuf::from("/a")),
            location: "/a/one.vsix".to_string(),
            readme: Readme::Inline(String::new()),
            icon: Icon::Placeholder,
            is_pre_release: false,
            is_preview: false,
        };

        let mut set = DescriptorSet::new();
        assert!(set.insert(base.clone()));
        assert!(!set.insert(PackageDescriptor {
            location: "/a/two.vsix".to_string(),
            ..base.clone()
        }));
        assert!(set.insert(PackageDescriptor {
            target: "linux-x64".to_string(),
            ..base.clone()
        }));
        assert!(set.insert(PackageDescriptor {
            version: "1.1.0".to_string(),
            ..base
        }));

        let items = set.into_vec();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].location, "/a/one.vsix");
    }
}
