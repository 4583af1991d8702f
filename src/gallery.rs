// Ties the loader, location index and search selection together, and drains
// results arriving from collaborator worker threads. All mutation happens
// synchronously inside a single event-handling turn; the only threads here
// sit behind channels.

use crossbeam_channel::{Receiver, Sender, unbounded};
use rustc_hash::FxHashMap;
use std::thread;

use crate::config::Config;
use crate::geocode::{GeocodeCache, ReverseGeocoder};
use crate::loader::LoaderWindow;
use crate::location_index::LocationIndex;
use crate::search;
use crate::store::{PhotoStore, Resolution};
use crate::viewport::ZoomViewport;
use crate::PhotoRecord;

/// One reverse-geocoding request, keyed by the photo that asked for it.
#[derive(Debug, Clone)]
pub struct GeocodeRequest {
    pub photo_id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone)]
pub struct GeocodeReply {
    pub photo_id: String,
    pub label: String,
}

/// Spawn a worker that resolves geocode requests off the event turn. The
/// worker owns the coordinate cache, so photos sharing a tile cost one
/// resolver call. Replies are applied by [`Gallery::pump_geocode`]; the
/// worker exits when the request sender is dropped.
pub fn spawn_geocode_worker<G>(
    geocoder: G,
    cache_capacity: usize,
) -> (Sender<GeocodeRequest>, Receiver<GeocodeReply>)
where
    G: ReverseGeocoder + Send + 'static,
{
    let (req_tx, req_rx) = unbounded::<GeocodeRequest>();
    let (reply_tx, reply_rx) = unbounded();

    thread::spawn(move || {
        let mut cache = GeocodeCache::new(cache_capacity);
        while let Ok(req) = req_rx.recv() {
            let label = cache.lookup(req.lat, req.lon, &geocoder);
            let _ = reply_tx.send(GeocodeReply { photo_id: req.photo_id, label });
        }
    });

    (req_tx, reply_rx)
}

pub struct Gallery {
    loader: LoaderWindow,
    index: LocationIndex,
    records: FxHashMap<String, PhotoRecord>,
    query: String,
    selected_labels: Vec<String>,
    viewer_config: crate::config::ViewerConfig,
    // One scroll-driven growth per layout pass; rapid scroll events while
    // thumbnails are still coming in must not stack pages.
    growth_pending: bool,
    geocode_tx: Option<Sender<GeocodeRequest>>,
}

impl Gallery {
    pub fn new(config: &Config) -> Self {
        Self {
            loader: LoaderWindow::new(&config.loader),
            index: LocationIndex::new(),
            records: FxHashMap::default(),
            query: String::new(),
            selected_labels: Vec::new(),
            viewer_config: config.viewer.clone(),
            growth_pending: false,
            geocode_tx: None,
        }
    }

    /// Wire up the geocode side channel. Without it photos simply never gain
    /// location labels.
    pub fn attach_geocoder(&mut self, tx: Sender<GeocodeRequest>) {
        self.geocode_tx = Some(tx);
    }

    pub fn loader(&self) -> &LoaderWindow {
        &self.loader
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// Fetch the id sequence. A failed or empty fetch is an empty gallery.
    pub fn load_ids(&mut self, store: &impl PhotoStore) {
        self.loader.begin_fetch();
        match store.fetch_photo_ids() {
            Ok(ids) => self.loader.reset(ids),
            Err(e) => {
                log::warn!("photo id fetch failed, showing empty gallery: {e}");
                self.loader.fetch_failed();
            }
        }
        self.growth_pending = false;
    }

    /// Store a fetched record snapshot and queue reverse geocoding when it
    /// carries a usable GPS fix.
    pub fn ingest(&mut self, record: PhotoRecord) {
        if let Some(gps) = record.gps
            && gps.has_fix()
            && let Some(tx) = &self.geocode_tx
        {
            let _ = tx.send(GeocodeRequest {
                photo_id: record.id.clone(),
                lat: gps.lat,
                lon: gps.lon,
            });
        }
        self.records.insert(record.id.clone(), record);
    }

    /// Fetch thumbnail records for visible ids that have not been
    /// materialized yet. Individual failures are logged and skipped; the
    /// surrounding UI offers manual retry if it wants one.
    pub fn fetch_visible(&mut self, store: &impl PhotoStore) {
        let missing: Vec<String> = self
            .loader
            .visible_ids()
            .iter()
            .filter(|id| !self.records.contains_key(*id))
            .cloned()
            .collect();

        for id in missing {
            match store.fetch_photo_record(&id, Resolution::Thumbnail) {
                Ok(record) => self.ingest(record),
                Err(e) => log::warn!("could not load photo {id}: {e}"),
            }
        }
    }

    /// Apply completed geocode lookups to the index. Stale replies for
    /// photos no longer on screen are applied as-is, last write wins.
    /// Returns whether the index changed, signalling a re-render; labels
    /// are not assumed to exist at first render.
    pub fn pump_geocode(&mut self, replies: &Receiver<GeocodeReply>) -> bool {
        let mut changed = false;
        while let Ok(reply) = replies.try_recv() {
            if reply.label.is_empty() {
                continue;
            }
            self.index.record(&reply.photo_id, &reply.label);
            changed = true;
        }
        changed
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn toggle_label(&mut self, label: &str) {
        if let Some(pos) = self.selected_labels.iter().position(|l| l == label) {
            self.selected_labels.remove(pos);
        } else {
            self.selected_labels.push(label.to_string());
        }
    }

    pub fn selected_labels(&self) -> &[String] {
        &self.selected_labels
    }

    /// Label set for search suggestions, sorted.
    pub fn location_labels(&self) -> Vec<String> {
        self.index.all_labels()
    }

    pub fn record(&self, photo_id: &str) -> Option<&PhotoRecord> {
        self.records.get(photo_id)
    }

    /// The visible window with the current query/label filter applied.
    pub fn filtered_visible_ids(&self) -> Vec<String> {
        search::filter(
            &self.query,
            &self.selected_labels,
            self.loader.visible_ids(),
            &self.records,
            &self.index,
        )
    }

    /// Scroll event from the viewport. Grows the window at most once until
    /// [`Self::layout_settled`] confirms the new content has been laid out.
    pub fn on_scroll(&mut self, scroll_top: f32, client_height: f32, content_height: f32) -> bool {
        if self.growth_pending || !self.loader.near_end(scroll_top, client_height, content_height)
        {
            return false;
        }
        if self.loader.on_scroll_near_end() {
            self.growth_pending = true;
            true
        } else {
            false
        }
    }

    /// The grid finished laying out the current window. Re-arms scroll
    /// growth, and keeps growing while the content is too short to ever
    /// scroll.
    pub fn layout_settled(&mut self, client_height: f32, content_height: f32) -> bool {
        self.growth_pending = false;
        if content_height <= client_height {
            return self.loader.on_content_underfilled();
        }
        false
    }

    pub fn set_columns(&mut self, columns: usize) {
        self.loader.on_columns_change(columns);
        self.growth_pending = false;
    }

    /// Open a viewer for a photo. Natural dimensions are seeded from the
    /// record when the server knows them; otherwise the viewer stays inert
    /// until `set_natural_size` is called with the decoded raster size.
    pub fn open_viewer(
        &self,
        photo_id: &str,
        client_width: f32,
        client_height: f32,
    ) -> Option<ZoomViewport> {
        let record = self.records.get(photo_id)?;
        let mut viewer = ZoomViewport::new(&self.viewer_config, client_width, client_height);
        if record.width > 0 && record.height > 0 {
            viewer.set_natural_size(record.width, record.height);
        }
        Some(viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, GpsPosition};
    use std::collections::HashMap;

    struct FakeStore {
        ids: Vec<String>,
        records: HashMap<String, PhotoRecord>,
        fail_ids: bool,
    }

    impl FakeStore {
        fn new(count: usize) -> Self {
            let mut records = HashMap::new();
            let ids: Vec<String> = (0..count).map(|i| format!("photo-{i}")).collect();
            for id in &ids {
                records.insert(id.clone(), photo(id, None));
            }
            Self { ids, records, fail_ids: false }
        }
    }

    impl PhotoStore for FakeStore {
        fn fetch_photo_ids(&self) -> crate::Result<Vec<String>> {
            if self.fail_ids {
                return Err(Error::Store("connection refused".to_string()));
            }
            Ok(self.ids.clone())
        }

        fn fetch_photo_record(
            &self,
            photo_id: &str,
            _resolution: Resolution,
        ) -> crate::Result<PhotoRecord> {
            self.records
                .get(photo_id)
                .cloned()
                .ok_or_else(|| Error::Store(format!("no such photo {photo_id}")))
        }

        fn resize_raster(
            &self,
            bytes: &[u8],
            max_width: u32,
            max_height: u32,
        ) -> crate::Result<Vec<u8>> {
            crate::raster::fit_to_viewport(bytes, max_width, max_height).map(|f| f.rgba)
        }
    }

    fn photo(id: &str, gps: Option<GpsPosition>) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            name: format!("{id} name"),
            description: String::new(),
            thumbnail: Vec::new(),
            full: Vec::new(),
            captured_at: None,
            gps,
            width: 2000,
            height: 1000,
            camera_make: String::new(),
            camera_model: String::new(),
            uploaded_at: None,
        }
    }

    struct FixedGeocoder(&'static str);

    impl ReverseGeocoder for FixedGeocoder {
        fn resolve(&self, _lat: f64, _lon: f64) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_end_to_end_scroll_disclosure() {
        let store = FakeStore::new(10);
        let mut gallery = Gallery::new(&Config::default());

        gallery.set_columns(2);
        gallery.load_ids(&store);
        assert_eq!(gallery.loader().visible_count(), 4);

        // Near the end at 2000 content height: grows once, then the latch
        // holds until layout settles
        assert!(gallery.on_scroll(1350.0, 600.0, 2000.0));
        assert_eq!(gallery.loader().visible_count(), 8);
        assert!(!gallery.on_scroll(1360.0, 600.0, 2000.0));
        assert_eq!(gallery.loader().visible_count(), 8);

        gallery.layout_settled(600.0, 4000.0);
        assert!(gallery.on_scroll(3350.0, 600.0, 4000.0));
        assert_eq!(gallery.loader().visible_count(), 10);
        assert!(gallery.loader().is_complete());
    }

    #[test]
    fn test_failed_id_fetch_degrades_to_empty() {
        let mut store = FakeStore::new(10);
        store.fail_ids = true;

        let mut gallery = Gallery::new(&Config::default());
        gallery.load_ids(&store);
        assert!(gallery.loader().visible_ids().is_empty());
        assert!(gallery.filtered_visible_ids().is_empty());
    }

    #[test]
    fn test_underfilled_viewport_keeps_growing() {
        let store = FakeStore::new(10);
        let mut gallery = Gallery::new(&Config::default());
        gallery.set_columns(1);
        gallery.load_ids(&store);
        assert_eq!(gallery.loader().visible_count(), 2);

        // Content never fills a tall viewport; layout passes grow it out
        while gallery.layout_settled(2000.0, 500.0) {}
        assert!(gallery.loader().is_complete());
    }

    #[test]
    fn test_geocode_side_channel_end_to_end() {
        let (tx, replies) = spawn_geocode_worker(FixedGeocoder("Uusimaa, Finland"), 64);

        let mut gallery = Gallery::new(&Config::default());
        gallery.attach_geocoder(tx);

        gallery.ingest(photo("p1", Some(GpsPosition { lat: 60.17, lon: 24.94, alt: 8.0 })));
        gallery.ingest(photo("p2", Some(GpsPosition { lat: 0.0, lon: 0.0, alt: 0.0 })));
        gallery.ingest(photo("p3", None));

        // The worker races the assertion; poll the drain like a render loop
        let mut changed = false;
        for _ in 0..200 {
            if gallery.pump_geocode(&replies) {
                changed = true;
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }

        assert!(changed);
        assert_eq!(gallery.location_labels(), vec!["Uusimaa, Finland"]);
        assert_eq!(gallery.index().ids_for_label("Uusimaa, Finland"), vec!["p1"]);
        assert_eq!(gallery.index().label_for_id("p2"), None);
        assert_eq!(gallery.index().label_for_id("p3"), None);
    }

    #[test]
    fn test_filter_over_visible_window() {
        let store = FakeStore::new(10);
        let mut gallery = Gallery::new(&Config::default());
        gallery.set_columns(2);
        gallery.load_ids(&store);
        gallery.fetch_visible(&store);

        assert_eq!(gallery.filtered_visible_ids().len(), 4);

        gallery.set_query("photo-1 name");
        assert_eq!(gallery.filtered_visible_ids(), vec!["photo-1"]);

        gallery.set_query("no such photo anywhere");
        assert!(gallery.filtered_visible_ids().is_empty());
    }

    #[test]
    fn test_toggle_label_selection() {
        let mut gallery = Gallery::new(&Config::default());
        gallery.toggle_label("Tyrol, Austria");
        assert_eq!(gallery.selected_labels(), ["Tyrol, Austria"]);
        gallery.toggle_label("Tyrol, Austria");
        assert!(gallery.selected_labels().is_empty());
    }

    #[test]
    fn test_open_viewer_seeds_dimensions() {
        let store = FakeStore::new(3);
        let mut gallery = Gallery::new(&Config::default());
        gallery.set_columns(2);
        gallery.load_ids(&store);
        gallery.fetch_visible(&store);

        let mut viewer = gallery.open_viewer("photo-0", 800.0, 600.0).unwrap();
        assert_eq!(viewer.rendered_size(), Some((2000.0, 1000.0)));
        viewer.zoom_in(None);
        assert_eq!(viewer.current_zoom(), 1.5);

        assert!(gallery.open_viewer("unknown", 800.0, 600.0).is_none());
    }
}
