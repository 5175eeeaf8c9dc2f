//! Sort, filter and search stages feeding the carousel and search views.

use bitflags::bitflags;

use super::entry::AppEntry;
use super::list_model::ListModel;

bitflags! {
    /// Which filters the shell may apply to the app list at all; the
    /// persisted `app-filter-mode` setting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AppFilterMode: u32 {
        /// Hiding apps that do not fit the screen is allowed.
        const ADAPTIVE = 1 << 0;
    }
}

/// Runtime filter state for the carousel/grid views.
#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub mode: AppFilterMode,
    /// User toggle: show adaptive apps only. Ignored unless `mode` contains
    /// [`AppFilterMode::ADAPTIVE`].
    pub filter_adaptive: bool,
    pub force_adaptive: Vec<String>,
}

impl AppFilter {
    pub fn allows(&self, entry: &AppEntry) -> bool {
        if !self.mode.contains(AppFilterMode::ADAPTIVE) {
            return true;
        }
        if !self.filter_adaptive {
            return true;
        }
        entry.is_adaptive(&self.force_adaptive)
    }
}

/// Fold user input into the canonical search form.
pub fn fold_search(input: &str) -> String { input.to_lowercase() }

/// Substring search over the textual attributes of an entry. The needle must
/// already be case-folded; an empty needle matches everything.
pub fn matches_search(entry: &AppEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let attrs = [
        Some(entry.name.as_str()),
        Some(entry.id.as_str()),
        entry.description.as_deref(),
        entry.categories.as_deref(),
    ];
    for attr in attrs.into_iter().flatten() {
        if attr.to_lowercase().contains(needle) {
            return true;
        }
    }

    entry.keywords.iter().any(|keyword| keyword.to_lowercase().contains(needle))
}

pub fn is_favorite(entry: &AppEntry, favorites: &[String]) -> bool {
    favorites.iter().any(|id| id == &entry.id)
}

fn sort_key(entry: &AppEntry) -> (String, String) {
    (entry.name.to_lowercase(), entry.id.clone())
}

fn sort_by_name(entries: &mut [AppEntry]) {
    entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

/// The carousel's favorites group: filtered favorites in the order of the
/// `favorites` setting.
pub fn favorites_group(
    registry: &ListModel<AppEntry>,
    favorites: &[String],
    filter: &AppFilter,
) -> Vec<AppEntry> {
    favorites
        .iter()
        .filter_map(|id| registry.iter().find(|entry| &entry.id == id))
        .filter(|entry| filter.allows(entry))
        .cloned()
        .collect()
}

/// The carousel's regular group: everything else that passes the filter,
/// sorted by display name.
pub fn regular_group(
    registry: &ListModel<AppEntry>,
    favorites: &[String],
    filter: &AppFilter,
) -> Vec<AppEntry> {
    let mut entries: Vec<AppEntry> = registry
        .iter()
        .filter(|entry| !is_favorite(entry, favorites) && filter.allows(entry))
        .cloned()
        .collect();
    sort_by_name(&mut entries);
    entries
}

/// The flat search view: every filtered entry matching the needle, sorted by
/// display name. Favorites are not split out while searching.
pub fn search_group(
    registry: &ListModel<AppEntry>,
    filter: &AppFilter,
    needle: &str,
) -> Vec<AppEntry> {
    let mut entries: Vec<AppEntry> = registry
        .iter()
        .filter(|entry| filter.allows(entry) && matches_search(entry, needle))
        .cloned()
        .collect();
    sort_by_name(&mut entries);
    entries
}

/// Insertion index keeping `sorted` ordered by display name.
pub fn sorted_insert_index(sorted: &ListModel<AppEntry>, entry: &AppEntry) -> usize {
    let key = sort_key(entry);
    sorted.items().partition_point(|existing| sort_key(existing) < key)
}
