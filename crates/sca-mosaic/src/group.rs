//! Grouping scenes by acquisition date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use sca_common::{BoundingBox, Scene};

/// All scenes captured on one UTC calendar date.
#[derive(Debug)]
pub struct DateGroup {
    pub date: NaiveDate,
    /// Sorted by acquisition timestamp, oldest first. Merge order relies on
    /// this: later captures overwrite earlier ones.
    pub scenes: Vec<Scene>,
}

/// Partition scenes into chronologically ordered date groups.
pub fn group_by_date(scenes: Vec<Scene>) -> Vec<DateGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Scene>> = BTreeMap::new();
    for scene in scenes {
        by_date
            .entry(scene.acquisition_date())
            .or_default()
            .push(scene);
    }

    by_date
        .into_iter()
        .map(|(date, mut scenes)| {
            scenes.sort_by_key(|s| s.acquired);
            DateGroup { date, scenes }
        })
        .collect()
}

impl DateGroup {
    /// Drop tiles that have no valid pixels inside the AOI.
    ///
    /// Returns the number of dropped scenes. A group left empty afterwards
    /// produces no mosaic for that date.
    pub fn retain_scenes_with_data(&mut self, aoi: &BoundingBox) -> usize {
        let before = self.scenes.len();
        self.scenes.retain(|scene| {
            let keep = scene.raster.has_valid_data_in(aoi);
            if !keep {
                debug!(scene = %scene.id, date = %self.date, "No valid AOI data, dropping tile");
            }
            keep
        });
        before - self.scenes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sca_common::{Band, Crs, GeoTransform, Raster};
    use test_utils::{scene_at, uniform_raster};

    #[test]
    fn test_groups_sorted_by_date_and_time() {
        let scenes = vec![
            scene_at("b", "2021-07-15T20:00:00Z"),
            scene_at("a", "2021-07-14T10:00:00Z"),
            scene_at("c", "2021-07-14T08:00:00Z"),
        ];

        let groups = group_by_date(scenes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date.to_string(), "2021-07-14");
        assert_eq!(groups[0].scenes.len(), 2);
        // within a date, oldest first
        assert_eq!(groups[0].scenes[0].id, "c");
        assert_eq!(groups[0].scenes[1].id, "a");
        assert_eq!(groups[1].scenes[0].id, "b");
    }

    #[test]
    fn test_retain_drops_empty_tiles() {
        let valid = scene_at("valid", "2021-07-14T10:00:00Z");
        let aoi = valid.raster.bbox();

        // all-NaN tile on the same grid
        let empty_raster = Raster::filled_no_data(
            4,
            4,
            GeoTransform::north_up(500000.0, 6700000.0, 3.0),
            Crs::new(32606),
        );
        let mut empty = scene_at("empty", "2021-07-14T11:00:00Z");
        empty.raster = empty_raster;

        let mut group = group_by_date(vec![valid, empty]).remove(0);
        let dropped = group.retain_scenes_with_data(&aoi);

        assert_eq!(dropped, 1);
        assert_eq!(group.scenes.len(), 1);
        assert_eq!(group.scenes[0].id, "valid");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_date(Vec::new()).is_empty());
    }

    #[test]
    fn test_retain_checks_aoi_overlap() {
        // valid data, but entirely outside the AOI
        let mut scene = scene_at("far", "2021-07-14T10:00:00Z");
        scene.raster = uniform_raster(4, 4, [0.1, 0.2, 0.3, 0.4]);
        let far_away = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        let mut group = group_by_date(vec![scene]).remove(0);
        group.retain_scenes_with_data(&far_away);
        assert!(group.scenes.is_empty());

        // sanity: the raster itself had data
        let raster = uniform_raster(4, 4, [0.1, 0.2, 0.3, 0.4]);
        assert!(raster.sample(Band::Blue, 0, 0) > 0.0);
    }
}
