//! Maintains the application list pipeline behind the carousel and search
//! views: the registry collection, its favorites/regular split, one page
//! view per carousel page, and the debounced search results.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::actor::broadcast::{BroadcastSender, ShellEvent};
use crate::apps::carousel::{CarouselPages, PageEdit, PageGroup};
use crate::apps::entry::AppEntry;
use crate::apps::list_model::{ListChange, ListModel};
use crate::apps::paginated::PaginatedView;
use crate::apps::pipeline::{self, AppFilter};
use crate::common::config::Settings;
use crate::sys::timer::Debounce;

pub type Sender = crate::actor::Sender<Event>;
pub type Receiver = crate::actor::Receiver<Event>;

#[derive(Debug)]
pub enum Event {
    /// Initial (or refreshed) registry contents.
    AppsDiscovered(Vec<AppEntry>),
    AppInstalled(AppEntry),
    AppUninstalled(String),
    /// Persisted settings changed externally.
    SettingsChanged(Settings),
    SetFilterAdaptive(bool),
    ToggleFilterAdaptive,
    /// Raw search entry input.
    SearchChanged(String),
    SearchDebounceElapsed,
    ResetCarousel,
}

pub struct Overview {
    receiver: Receiver,
    sender: Sender,
    broadcast: BroadcastSender,
    registry: ListModel<AppEntry>,
    favorites_list: ListModel<AppEntry>,
    regular_list: ListModel<AppEntry>,
    favorite_pages: Vec<PaginatedView>,
    regular_pages: Vec<PaginatedView>,
    pages: CarouselPages,
    filter: AppFilter,
    favorites: Vec<String>,
    apps_per_page: usize,
    /// Case-folded needle; empty means no search is active.
    search_string: String,
    debounce: Debounce,
}

impl Overview {
    pub fn new(broadcast: BroadcastSender, settings: &Settings) -> (Self, Sender) {
        let (sender, receiver) = crate::actor::channel();
        let this = Self {
            receiver,
            sender: sender.clone(),
            broadcast,
            registry: ListModel::new(),
            favorites_list: ListModel::new(),
            regular_list: ListModel::new(),
            favorite_pages: Vec::new(),
            regular_pages: Vec::new(),
            pages: CarouselPages::new(),
            filter: AppFilter {
                mode: settings.apps.filter_mode(),
                filter_adaptive: false,
                force_adaptive: settings.apps.force_adaptive.clone(),
            },
            favorites: settings.apps.favorites.clone(),
            apps_per_page: settings.apps.apps_per_page.max(1),
            search_string: String::new(),
            debounce: Debounce::new(Duration::from_millis(settings.shell.search_debounce_ms)),
        };
        (this, sender)
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.receiver.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    #[instrument(name = "overview::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::AppsDiscovered(entries) => self.on_apps_discovered(entries),
            Event::AppInstalled(entry) => self.on_app_installed(entry),
            Event::AppUninstalled(id) => self.on_app_uninstalled(&id),
            Event::SettingsChanged(settings) => self.on_settings_changed(&settings),
            Event::SetFilterAdaptive(enable) => self.set_filter_adaptive(enable),
            Event::ToggleFilterAdaptive => self.set_filter_adaptive(!self.filter.filter_adaptive),
            Event::SearchChanged(input) => self.on_search_changed(&input),
            Event::SearchDebounceElapsed => self.do_search(),
            Event::ResetCarousel => self.broadcast.send(ShellEvent::CarouselReset),
        }
    }

    fn on_apps_discovered(&mut self, entries: Vec<AppEntry>) {
        debug!(count = entries.len(), "registry populated");
        self.registry.replace_all(entries);
        self.refresh_groups();
        self.refresh_search();
    }

    fn on_app_installed(&mut self, entry: AppEntry) {
        if self.registry.position_of(|e| e.id == entry.id).is_some() {
            debug!(id = %entry.id, "duplicate install event; skipping");
            return;
        }
        debug!(id = %entry.id, "app installed");
        self.registry.push(entry.clone());

        if self.filter.allows(&entry) {
            if pipeline::is_favorite(&entry, &self.favorites) {
                let index = self.favorite_insert_index(&entry);
                let change = self.favorites_list.insert(index, entry);
                self.apply_group_change(PageGroup::Favorites, change);
            } else {
                let index = pipeline::sorted_insert_index(&self.regular_list, &entry);
                let change = self.regular_list.insert(index, entry);
                self.apply_group_change(PageGroup::Regular, change);
            }
            self.repaginate();
        }
        self.refresh_search();
    }

    fn on_app_uninstalled(&mut self, id: &str) {
        let Some(position) = self.registry.position_of(|e| e.id == id) else {
            debug!(id, "uninstall for unknown app; skipping");
            return;
        };
        debug!(id, "app uninstalled");
        self.registry.remove(position);

        if let Some(position) = self.favorites_list.position_of(|e| e.id == id) {
            let (_, change) = self.favorites_list.remove(position);
            self.apply_group_change(PageGroup::Favorites, change);
            self.repaginate();
        } else if let Some(position) = self.regular_list.position_of(|e| e.id == id) {
            let (_, change) = self.regular_list.remove(position);
            self.apply_group_change(PageGroup::Regular, change);
            self.repaginate();
        }
        self.refresh_search();
    }

    fn on_settings_changed(&mut self, settings: &Settings) {
        debug!("settings reloaded");
        self.filter.mode = settings.apps.filter_mode();
        self.filter.force_adaptive = settings.apps.force_adaptive.clone();
        self.favorites = settings.apps.favorites.clone();
        self.debounce
            .set_delay(Duration::from_millis(settings.shell.search_debounce_ms));

        let apps_per_page = settings.apps.apps_per_page.max(1);
        if apps_per_page != self.apps_per_page {
            self.apps_per_page = apps_per_page;
            self.rebuild_carousel();
        } else {
            self.refresh_groups();
        }
        self.refresh_search();
    }

    fn set_filter_adaptive(&mut self, enable: bool) {
        if self.filter.filter_adaptive == enable {
            return;
        }
        debug!(enable, "filter-adaptive changed");
        self.filter.filter_adaptive = enable;
        self.refresh_groups();
        self.refresh_search();
    }

    fn on_search_changed(&mut self, input: &str) {
        self.search_string = pipeline::fold_search(input);
        self.debounce.cancel();
        if self.search_string.is_empty() {
            // No delay when the entry is cleared.
            self.do_search();
        } else {
            let sender = self.sender.clone();
            self.debounce.arm(move || sender.send(Event::SearchDebounceElapsed));
        }
    }

    fn do_search(&mut self) {
        let results = pipeline::search_group(&self.registry, &self.filter, &self.search_string);
        let ids = results.into_iter().map(|entry| entry.id).collect();
        self.broadcast.send(ShellEvent::SearchResultsChanged { ids });
        self.broadcast.send(ShellEvent::FavoritesRevealed {
            revealed: self.search_string.is_empty(),
        });
    }

    /// Re-run an active search after a registry or filter change. Input
    /// debouncing does not apply here; only typing is debounced.
    fn refresh_search(&mut self) {
        if !self.search_string.is_empty() {
            self.do_search();
        }
    }

    /// Recompute both groups from scratch, as after a refilter.
    fn refresh_groups(&mut self) {
        let favorites = pipeline::favorites_group(&self.registry, &self.favorites, &self.filter);
        let regular = pipeline::regular_group(&self.registry, &self.favorites, &self.filter);
        let favorites_change = self.favorites_list.replace_all(favorites);
        let regular_change = self.regular_list.replace_all(regular);
        self.apply_group_change(PageGroup::Favorites, favorites_change);
        self.apply_group_change(PageGroup::Regular, regular_change);
        self.repaginate();
    }

    /// Forward a group-list mutation to that group's page views and publish
    /// `items-changed` for every page it touched.
    fn apply_group_change(&mut self, group: PageGroup, change: ListChange) {
        if change.is_noop() {
            return;
        }
        let offset = match group {
            PageGroup::Favorites => 0,
            PageGroup::Regular => self.pages.favorites_pages(),
        };
        let (model, views) = match group {
            PageGroup::Favorites => (&self.favorites_list, &mut self.favorite_pages),
            PageGroup::Regular => (&self.regular_list, &mut self.regular_pages),
        };

        let mut events = Vec::new();
        for (i, view) in views.iter_mut().enumerate() {
            if let Some(items) = view.apply_change(model, &change) {
                events.push(ShellEvent::PageItemsChanged {
                    position: offset + i,
                    previous: items.previous,
                    current: items.current,
                });
            }
        }
        for event in events {
            self.broadcast.send(event);
        }
    }

    fn repaginate(&mut self) {
        let old_split = (self.pages.favorites_pages(), self.pages.total_pages());
        let edits = self.pages.repaginate(
            self.favorites_list.len(),
            self.regular_list.len(),
            self.apps_per_page,
        );
        self.sync_views();

        for edit in edits {
            let event = match edit {
                PageEdit::Remove { position } => ShellEvent::PageRemoved { position },
                PageEdit::Insert { position, group, page_index } => {
                    ShellEvent::PageInserted { position, group, page_index }
                }
            };
            self.broadcast.send(event);
        }

        let new_split = (self.pages.favorites_pages(), self.pages.total_pages());
        if new_split != old_split {
            self.broadcast.send(ShellEvent::IndicatorChanged {
                favorites_pages: new_split.0,
                total_pages: new_split.1,
            });
        }
    }

    /// Keep one live page view per carousel page.
    fn sync_views(&mut self) {
        Self::sync_group_views(
            &mut self.favorite_pages,
            &self.favorites_list,
            self.pages.favorites_pages(),
            self.apps_per_page,
        );
        Self::sync_group_views(
            &mut self.regular_pages,
            &self.regular_list,
            self.pages.regular_pages(),
            self.apps_per_page,
        );
    }

    fn sync_group_views(
        views: &mut Vec<PaginatedView>,
        model: &ListModel<AppEntry>,
        count: usize,
        page_size: usize,
    ) {
        views.truncate(count);
        while views.len() < count {
            match PaginatedView::new(model, page_size, views.len()) {
                Ok(view) => views.push(view),
                Err(err) => {
                    warn!(%err, "could not create page view");
                    return;
                }
            }
        }
    }

    /// The page size changed, so every page's geometry is stale: tear the
    /// carousel down and repopulate from the current groups.
    fn rebuild_carousel(&mut self) {
        let total = self.pages.total_pages();
        for position in 0..total {
            self.broadcast.send(ShellEvent::PageRemoved { position });
        }
        self.pages = CarouselPages::new();
        self.favorite_pages.clear();
        self.regular_pages.clear();
        self.refresh_groups();
    }

    /// Index keeping `favorites_list` in the order of the favorites setting.
    fn favorite_insert_index(&self, entry: &AppEntry) -> usize {
        let Some(rank) = self.favorites.iter().position(|id| id == &entry.id) else {
            return self.favorites_list.len();
        };
        self.favorites_list
            .iter()
            .filter(|existing| {
                self.favorites
                    .iter()
                    .position(|id| id == &existing.id)
                    .is_some_and(|r| r < rank)
            })
            .count()
    }
}
