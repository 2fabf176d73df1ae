//! Manifest parsing for `.vsix` packages.
//!
//! Two dialects are understood: the plain `extension/package.json` and the
//! richer `extension.vsixmanifest` XML document. Both are decoded into typed
//! schemas once, then merged into an [`ExtensionManifest`].

use serde::Deserialize;

use crate::error::{PkgError, Result};

/// Asset type marking the human-readable details (readme) entry.
pub const DETAILS_ASSET_TYPE: &str = "Microsoft.VisualStudio.Services.Content.Details";
/// Asset type marking the default icon entry.
pub const ICON_ASSET_TYPE: &str = "Microsoft.VisualStudio.Services.Icons.Default";
/// Property id carrying the pre-release flag.
pub const PRE_RELEASE_PROPERTY: &str = "Microsoft.VisualStudio.Code.PreRelease";
/// Target platform used when a package does not declare one.
pub const TARGET_ANY: &str = "any";

/// `extension/package.json`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preview: Option<bool>,
    /// Icon path relative to the `extension/` folder.
    #[serde(default)]
    pub icon: Option<String>,
}

/// `extension.vsixmanifest`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VsixManifest {
    #[serde(rename = "Metadata", default)]
    pub metadata: VsixMetadata,
    #[serde(rename = "Assets", default)]
    pub assets: VsixAssets,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VsixMetadata {
    #[serde(rename = "Identity", default)]
    pub identity: VsixIdentity,
    #[serde(rename = "DisplayName", default)]
    pub display_name: Option<TextNode>,
    #[serde(rename = "Description", default)]
    pub description: Option<TextNode>,
    #[serde(rename = "Icon", default)]
    pub icon: Option<TextNode>,
    #[serde(rename = "Properties", default)]
    pub properties: VsixProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VsixIdentity {
    #[serde(rename = "@Id", default)]
    pub id: Option<String>,
    #[serde(rename = "@Version", default)]
    pub version: Option<String>,
    #[serde(rename = "@Publisher", default)]
    pub publisher: Option<String>,
    #[serde(rename = "@TargetPlatform", default)]
    pub target_platform: Option<String>,
}

/// Element whose only interesting content is its text; attributes such as
/// `xml:space` are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TextNode {
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// A lone `<Property>` and a run of them both land in the same `Vec`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VsixProperties {
    #[serde(rename = "Property", default)]
    pub items: Vec<VsixProperty>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VsixProperty {
    #[serde(rename = "@Id")]
    pub id: String,
    #[serde(rename = "@Value", default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VsixAssets {
    #[serde(rename = "Asset", default)]
    pub items: Vec<VsixAsset>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VsixAsset {
    #[serde(rename = "@Type")]
    pub asset_type: String,
    #[serde(rename = "@Path")]
    pub path: String,
}

impl VsixManifest {
    pub fn asset_path(&self, asset_type: &str) -> Option<&str> {
        self.assets
            .items
            .iter()
            .find(|asset| asset.asset_type == asset_type)
            .map(|asset| asset.path.as_str())
            .filter(|path| !path.is_empty())
    }

    pub fn property(&self, id: &str) -> Option<&str> {
        self.metadata
            .properties
            .items
            .iter()
            .find(|property| property.id == id)
            .map(|property| property.value.as_str())
    }

    pub fn is_pre_release(&self) -> bool {
        self.property(PRE_RELEASE_PROPERTY)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// Unified view of a package's identity and presentation metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionManifest {
    pub publisher: String,
    pub name: String,
    pub version: String,
    pub display_name: String,
    pub description: String,
    pub target: String,
    pub is_pre_release: bool,
    pub is_preview: bool,
    /// In-archive location of the readme, when one is declared.
    pub readme_entry: Option<String>,
    /// In-archive location of the icon, when one is declared.
    pub icon_entry: Option<String>,
}

impl ExtensionManifest {
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.publisher, self.name)
    }

    /// Merge the two dialects. Identity fields declared by the XML manifest
    /// take precedence over `package.json`.
    pub fn from_parts(origin: &str, json: PackageJson, xml: Option<&VsixManifest>) -> Result<Self> {
        let identity = xml.map(|m| &m.metadata.identity);

        let publisher = non_empty(identity.and_then(|i| i.publisher.clone()))
            .or_else(|| non_empty(json.publisher.clone()))
            .ok_or_else(|| PkgError::malformed(origin, "missing required field `publisher`"))?;
        let name = non_empty(json.name.clone())
            .or_else(|| non_empty(identity.and_then(|i| i.id.clone())))
            .ok_or_else(|| PkgError::malformed(origin, "missing required field `name`"))?;
        let version = non_empty(json.version.clone())
            .or_else(|| non_empty(identity.and_then(|i| i.version.clone())))
            .ok_or_else(|| PkgError::malformed(origin, "missing required field `version`"))?;

        let display_name = xml
            .and_then(|m| m.metadata.display_name.as_ref())
            .and_then(|node| non_empty(Some(node.text.clone())))
            .or_else(|| non_empty(json.display_name.clone()))
            .unwrap_or_else(|| name.clone());
        let description = xml
            .and_then(|m| m.metadata.description.as_ref())
            .and_then(|node| non_empty(Some(node.text.clone())))
            .or(json.description.clone())
            .unwrap_or_default();
        let target = non_empty(identity.and_then(|i| i.target_platform.clone()))
            .unwrap_or_else(|| TARGET_ANY.to_string());

        let readme_entry = xml
            .and_then(|m| m.asset_path(DETAILS_ASSET_TYPE))
            .map(str::to_string);
        let icon_entry = xml
            .and_then(|m| m.asset_path(ICON_ASSET_TYPE))
            .map(str::to_string)
            .or_else(|| {
                xml.and_then(|m| m.metadata.icon.as_ref())
                    .and_then(|node| non_empty(Some(node.text.clone())))
            })
            .or_else(|| {
                non_empty(json.icon.clone())
                    .map(|icon| format!("extension/{}", icon.trim_start_matches("./")))
            });

        Ok(ExtensionManifest {
            publisher,
            name,
            version,
            display_name,
            description,
            target,
            is_pre_release: xml.is_some_and(VsixManifest::is_pre_release),
            is_preview: json.preview.unwrap_or(false),
            readme_entry,
            icon_entry,
        })
    }
}

pub fn parse_package_json(origin: &str, text: &str) -> Result<PackageJson> {
    serde_json::from_str(text)
        .map_err(|e| PkgError::malformed(origin, format!("invalid package.json: {e}")))
}

pub fn parse_vsix_manifest(origin: &str, text: &str) -> Result<VsixManifest> {
    quick_xml::de::from_str(text)
        .map_err(|e| PkgError::malformed(origin, format!("invalid vsixmanifest: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<PackageManifest Version="2.0.0" xmlns="http://schemas.microsoft.com/developer/vsx-schema/2011" xmlns:d="http://schemas.microsoft.com/developer/vsx-schema-design/2011">
  <Metadata>
    <Identity Language="en-US" Id="tool" Version="1.2.0" Publisher="acme" TargetPlatform="linux-x64"/>
    <DisplayName>Acme Tool</DisplayName>
    <Description xml:space="preserve">Sharpens things</Description>
    <Tags>tools</Tags>
    <Properties>
      <Property Id="Microsoft.VisualStudio.Code.Engine" Value="^1.80.0" />
      <Property Id="Microsoft.VisualStudio.Code.PreRelease" Value="true" />
    </Properties>
  </Metadata>
  <Installation>
    <InstallationTarget Id="Microsoft.VisualStudio.Code"/>
  </Installation>
  <Dependencies/>
  <Assets>
    <Asset Type="Microsoft.VisualStudio.Code.Manifest" Path="extension/package.json" Addressable="true" />
    <Asset Type="Microsoft.VisualStudio.Services.Content.Details" Path="extension/README.md" Addressable="true" />
    <Asset Type="Microsoft.VisualStudio.Services.Icons.Default" Path="extension/images/icon.png" Addressable="true" />
  </Assets>
</PackageManifest>"#;

    const SINGLE_ELEMENT_MANIFEST: &str = r#"<PackageManifest Version="2.0.0">
  <Metadata>
    <Identity Id="tool" Version="1.2.0" Publisher="acme"/>
    <DisplayName>Acme Tool</DisplayName>
    <Properties>
      <Property Id="Microsoft.VisualStudio.Code.PreRelease" Value="false" />
    </Properties>
  </Metadata>
  <Assets>
    <Asset Type="Microsoft.VisualStudio.Services.Content.Details" Path="extension/docs/README.md" />
  </Assets>
</PackageManifest>"#;

    fn json(text: &str) -> PackageJson {
        parse_package_json("test", text).unwrap()
    }

    #[test]
    fn plain_manifest_builds_identifier() {
        let manifest = ExtensionManifest::from_parts(
            "test",
            json(r#"{"publisher":"acme","name":"tool","version":"1.2.0"}"#),
            None,
        )
        .unwrap();

        assert_eq!(manifest.identifier(), "acme.tool");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.display_name, "tool");
        assert_eq!(manifest.target, TARGET_ANY);
        assert!(!manifest.is_pre_release);
        assert!(manifest.readme_entry.is_none());
        assert!(manifest.icon_entry.is_none());
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        for text in [
            r#"{"name":"tool","version":"1.0.0"}"#,
            r#"{"publisher":"acme","version":"1.0.0"}"#,
            r#"{"publisher":"acme","name":"tool"}"#,
            r#"{"publisher":"  ","name":"tool","version":"1.0.0"}"#,
        ] {
            let err = ExtensionManifest::from_parts("test", json(text), None).unwrap_err();
            assert!(matches!(err, PkgError::MalformedManifest { .. }), "{text}");
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_package_json("test", "{ not json"),
            Err(PkgError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn rich_manifest_supplies_metadata() {
        let xml = parse_vsix_manifest("test", FULL_MANIFEST).unwrap();
        assert_eq!(xml.assets.items.len(), 3);

        let manifest = ExtensionManifest::from_parts(
            "test",
            json(r#"{"publisher":"ignored","name":"tool","version":"1.2.0","preview":true}"#),
            Some(&xml),
        )
        .unwrap();

        assert_eq!(manifest.identifier(), "acme.tool");
        assert_eq!(manifest.display_name, "Acme Tool");
        assert_eq!(manifest.description, "Sharpens things");
        assert_eq!(manifest.target, "linux-x64");
        assert!(manifest.is_pre_release);
        assert!(manifest.is_preview);
        assert_eq!(manifest.readme_entry.as_deref(), Some("extension/README.md"));
        assert_eq!(manifest.icon_entry.as_deref(), Some("extension/images/icon.png"));
    }

    #[test]
    fn single_asset_and_property_parse_as_lists() {
        let xml = parse_vsix_manifest("test", SINGLE_ELEMENT_MANIFEST).unwrap();
        assert_eq!(xml.assets.items.len(), 1);
        assert_eq!(xml.metadata.properties.items.len(), 1);
        assert_eq!(xml.asset_path(DETAILS_ASSET_TYPE), Some("extension/docs/README.md"));
        assert!(!xml.is_pre_release());
    }

    #[test]
    fn package_json_icon_is_resolved_under_extension_folder() {
        let manifest = ExtensionManifest::from_parts(
            "test",
            json(r#"{"publisher":"acme","name":"tool","version":"1.0.0","icon":"./media/logo.svg"}"#),
            None,
        )
        .unwrap();
        assert_eq!(manifest.icon_entry.as_deref(), Some("extension/media/logo.svg"));
    }

    #[test]
    fn broken_xml_is_malformed() {
        assert!(matches!(
            parse_vsix_manifest("test", "<PackageManifest><Metadata></Assets></PackageManifest>"),
            Err(PkgError::MalformedManifest { .. })
        ));
    }
}
