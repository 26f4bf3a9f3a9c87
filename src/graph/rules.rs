//! Classification and edge-label rules
//!
//! ORDER MATTERS: both tables are evaluated first-match-wins, so narrow
//! patterns (API routes, icon components) must come BEFORE the broader ones
//! they overlap with (pages, components). A path matched by nothing in
//! [`BUCKET_RULES`] falls into [`CATCH_ALL_BUCKET`].
//!
//! Directory entries are matched with a trailing `/` appended, so a prefix
//! rule such as `^pages/` also claims the `pages` directory itself.

use crate::domain::{EntryKind, RepoEntry};
use once_cell::sync::Lazy;
use regex::Regex;

pub const CATCH_ALL_BUCKET: &str = "Misc";

#[derive(Clone)]
pub struct BucketRule {
    pub name: &'static str,
    pub pattern: Regex,
}

#[derive(Clone)]
pub struct LabelRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub label: &'static str,
}

const API_ROUTES: &str = r"^(src/)?(pages|app)/api/";
const PAGES: &str = r"^(src/)?(pages|app)/";
const ICONS: &str = r"^(src/)?components/icons/";
const COMPONENTS: &str = r"^(src/)?components/";
const STYLES: &str = r"\.(css|scss|sass|less)$";
const TESTS: &str = r"(^|/)(tests?|__tests__)/|\.(test|spec)\.[A-Za-z0-9]+$";
const DOCS_EXT: &str = r"\.(md|mdx|rst|txt)$";

pub static BUCKET_RULES: Lazy<Vec<BucketRule>> = Lazy::new(|| {
    vec![
        BucketRule { name: "API Routes", pattern: Regex::new(API_ROUTES).expect("valid regex") },
        BucketRule { name: "Pages", pattern: Regex::new(PAGES).expect("valid regex") },
        BucketRule { name: "Icons", pattern: Regex::new(ICONS).expect("valid regex") },
        BucketRule { name: "Components", pattern: Regex::new(COMPONENTS).expect("valid regex") },
        BucketRule { name: "Hooks", pattern: Regex::new(r"^(src/)?hooks/").expect("valid regex") },
        BucketRule {
            name: "Services",
            pattern: Regex::new(r"^(src/)?(services|lib|utils)/").expect("valid regex"),
        },
        BucketRule {
            name: "Types",
            pattern: Regex::new(r"^(src/)?types/|\.d\.ts$").expect("valid regex"),
        },
        BucketRule {
            name: "Server",
            pattern: Regex::new(r"^(server|api|backend)/").expect("valid regex"),
        },
        BucketRule { name: "Tests", pattern: Regex::new(TESTS).expect("valid regex") },
        BucketRule { name: "Styles", pattern: Regex::new(STYLES).expect("valid regex") },
        BucketRule {
            name: "Static Assets",
            pattern: Regex::new(
                r"^(public|assets|static)/|\.(png|jpe?g|gif|svg|ico|webp|woff2?|ttf|eot)$",
            )
            .expect("valid regex"),
        },
        BucketRule {
            name: "Docs",
            pattern: Regex::new(&format!("^docs/|{DOCS_EXT}")).expect("valid regex"),
        },
        // Root-level files: manifests, tool configs, lockfiles.
        BucketRule { name: "Config", pattern: Regex::new(r"^[^/]+$").expect("valid regex") },
    ]
});

/// Heuristic edge labels, applied to file entries only. Directory edges stay
/// unlabeled unless an override names them.
pub static LABEL_RULES: Lazy<Vec<LabelRule>> = Lazy::new(|| {
    vec![
        LabelRule {
            name: "json",
            pattern: Regex::new(r"\.json$").expect("valid regex"),
            label: "reads JSON",
        },
        LabelRule {
            name: "api_route",
            pattern: Regex::new(API_ROUTES).expect("valid regex"),
            label: "handles request",
        },
        LabelRule {
            name: "icon",
            pattern: Regex::new(ICONS).expect("valid regex"),
            label: "imports icon",
        },
        LabelRule {
            name: "component",
            pattern: Regex::new(COMPONENTS).expect("valid regex"),
            label: "imports component",
        },
        LabelRule {
            name: "page",
            pattern: Regex::new(PAGES).expect("valid regex"),
            label: "renders page",
        },
        LabelRule {
            name: "hook",
            pattern: Regex::new(r"(^|/)use[A-Z][A-Za-z0-9]*\.(js|jsx|ts|tsx)$")
                .expect("valid regex"),
            label: "provides hook",
        },
        LabelRule {
            name: "style",
            pattern: Regex::new(STYLES).expect("valid regex"),
            label: "applies styles",
        },
        LabelRule { name: "test", pattern: Regex::new(TESTS).expect("valid regex"), label: "tests" },
        LabelRule {
            name: "docs",
            pattern: Regex::new(DOCS_EXT).expect("valid regex"),
            label: "documents",
        },
    ]
});

fn match_key(entry: &RepoEntry) -> std::borrow::Cow<'_, str> {
    match entry.kind {
        EntryKind::Tree => format!("{}/", entry.path).into(),
        EntryKind::Blob => entry.path.as_str().into(),
    }
}

/// Name of the single bucket `entry` belongs to.
pub fn classify(entry: &RepoEntry) -> &'static str {
    let key = match_key(entry);
    BUCKET_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&key))
        .map(|rule| rule.name)
        .unwrap_or(CATCH_ALL_BUCKET)
}

/// Every bucket name in emission order, catch-all last.
pub fn bucket_order() -> impl Iterator<Item = &'static str> {
    BUCKET_RULES.iter().map(|rule| rule.name).chain(std::iter::once(CATCH_ALL_BUCKET))
}

/// Heuristic label for the edge into `entry`; empty when nothing matches.
pub fn heuristic_label(entry: &RepoEntry) -> &'static str {
    if entry.kind == EntryKind::Tree {
        return "";
    }
    LABEL_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&entry.path))
        .map(|rule| rule.label)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_routes_win_over_pages() {
        assert_eq!(classify(&RepoEntry::blob("pages/api/contact.js")), "API Routes");
        assert_eq!(classify(&RepoEntry::blob("src/app/api/users/route.ts")), "API Routes");
        assert_eq!(classify(&RepoEntry::blob("pages/index.tsx")), "Pages");
    }

    #[test]
    fn icons_win_over_components() {
        assert_eq!(classify(&RepoEntry::blob("src/components/icons/Logo.tsx")), "Icons");
        assert_eq!(classify(&RepoEntry::blob("src/components/Header.tsx")), "Components");
    }

    #[test]
    fn directories_match_their_own_prefix() {
        assert_eq!(classify(&RepoEntry::tree("pages/api")), "API Routes");
        assert_eq!(classify(&RepoEntry::tree("pages")), "Pages");
        assert_eq!(classify(&RepoEntry::tree("src")), CATCH_ALL_BUCKET);
    }

    #[test]
    fn root_files_are_config_unless_docs() {
        assert_eq!(classify(&RepoEntry::blob("package.json")), "Config");
        assert_eq!(classify(&RepoEntry::blob("README.md")), "Docs");
    }

    #[test]
    fn unmatched_paths_fall_into_catch_all() {
        assert_eq!(classify(&RepoEntry::blob("scripts/deploy/run.sh")), CATCH_ALL_BUCKET);
    }

    #[test]
    fn bucket_order_ends_with_catch_all() {
        let order: Vec<&str> = bucket_order().collect();
        assert_eq!(order.first(), Some(&"API Routes"));
        assert_eq!(order.last(), Some(&CATCH_ALL_BUCKET));
        assert_eq!(order.len(), BUCKET_RULES.len() + 1);
    }

    #[test]
    fn heuristic_labels_follow_rule_order() {
        assert_eq!(heuristic_label(&RepoEntry::blob("src/data/site.json")), "reads JSON");
        // JSON beats the API-route rule because it is listed first.
        assert_eq!(heuristic_label(&RepoEntry::blob("pages/api/schema.json")), "reads JSON");
        assert_eq!(heuristic_label(&RepoEntry::blob("pages/api/contact.js")), "handles request");
        assert_eq!(heuristic_label(&RepoEntry::blob("src/components/Header.tsx")), "imports component");
        assert_eq!(heuristic_label(&RepoEntry::blob("src/hooks/useChat.ts")), "provides hook");
        assert_eq!(heuristic_label(&RepoEntry::blob("src/index.css")), "applies styles");
        assert_eq!(heuristic_label(&RepoEntry::blob("src/main.rs")), "");
    }

    #[test]
    fn directories_get_no_heuristic_label() {
        assert_eq!(heuristic_label(&RepoEntry::tree("src/components")), "");
    }
}
