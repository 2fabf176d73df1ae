//! Detail view for a selected package.
//!
//! The presentation layer owns one [`DetailPanel`]; selecting another package
//! replaces what it shows, closing it clears it.

use std::fmt::Write as _;

use crate::descriptor::{Icon, PackageDescriptor};

#[derive(Debug, Default)]
pub struct DetailPanel {
    current: Option<PackageDescriptor>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `descriptor`, replacing whatever was displayed.
    pub fn show(&mut self, descriptor: PackageDescriptor) -> &PackageDescriptor {
        self.current.insert(descriptor)
    }

    pub fn current(&self) -> Option<&PackageDescriptor> {
        self.current.as_ref()
    }

    pub fn close(&mut self) -> Option<PackageDescriptor> {
        self.current.take()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Plain-text rendering of the current package with the given readme
    /// markdown appended.
    pub fn render(&self, readme: &str) -> Option<String> {
        self.current.as_ref().map(|d| render_descriptor(d, readme))
    }
}

pub fn render_descriptor(d: &PackageDescriptor, readme: &str) -> String {
    let mut out = String::new();

    let mut title = d.display_name.clone();
    if !d.is_platform_neutral() {
        let _ = write!(title, " ({})", d.target);
    }
    let _ = write!(title, "  v{}", d.version);
    if d.is_preview {
        title.push_str("  [Preview]");
    }
    if d.is_pre_release {
        title.push_str("  [Pre-Release]");
    }
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", d.identifier);
    if !d.description.is_empty() {
        let _ = writeln!(out, "\n{}", d.description);
    }

    let _ = writeln!(out);
    let source = d.source_label();
    let _ = writeln!(
        out,
        "source:   {}",
        if source.is_empty() { "catalog" } else { source.as_str() }
    );
    let _ = writeln!(out, "location: {}", d.location);
    let icon = match &d.icon {
        Icon::DataUri(_) => "embedded",
        Icon::Url(url) => url.as_str(),
        Icon::Placeholder => "default",
    };
    let _ = writeln!(out, "icon:     {icon}");

    if !readme.trim().is_empty() {
        let _ = writeln!(out, "\n{}", readme.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PackageOrigin, Readme};

    fn descriptor(identifier: &str) -> PackageDescriptor {
        PackageDescriptor {
            identifier: identifier.to_string(),
            version: "1.2.0".to_string(),
            target: "linux-x64".to_string(),
            display_name: "Acme Tool".to_string(),
            description: "Sharpens things".to_string(),
            origin: PackageOrigin::Remote {
                base_url: "https://m.example.com".to_string(),
            },
            location: "https://m.example.com/dl/tool.vsix".to_string(),
            readme: Readme::Remote("readme.md".to_string()),
            icon: Icon::Placeholder,
            is_pre_release: true,
            is_preview: false,
        }
    }

    #[test]
    fn panel_holds_a_single_package() {
        let mut panel = DetailPanel::new();
        assert!(panel.render("").is_none());

        panel.show(descriptor("acme.tool"));
        panel.show(descriptor("acme.other"));
        assert_eq!(panel.current().unwrap().identifier, "acme.other");

        let closed = panel.close().unwrap();
        assert_eq!(closed.identifier, "acme.other");
        assert!(!panel.is_open());
    }

    #[test]
    fn render_lists_target_tags_and_readme() {
        let mut panel = DetailPanel::new();
        panel.show(descriptor("acme.tool"));
        let text = panel.render("# Usage\n").unwrap();

        assert!(text.starts_with("Acme Tool (linux-x64)  v1.2.0  [Pre-Release]\nacme.tool\n"));
        assert!(text.contains("source:   catalog"));
        assert!(text.contains("icon:     default"));
        assert!(text.ends_with("# Usage\n"));
    }
}
