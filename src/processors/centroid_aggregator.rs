use crate::models::{BoundingBox, CityCentroid, CityKey, ResolvedHotel};
use std::collections::BTreeMap;

/// Groups resolved hotels by (country, city) and places each city's centre at
/// the midpoint of its hotels' bounding box.
pub struct CentroidAggregator;

impl CentroidAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Fold hotels into per-city bounding boxes. Keys come out sorted, so the
    /// result does not depend on input order. Hotels without a city name
    /// belong to no city and are left out.
    pub fn bounding_boxes(&self, hotels: &[ResolvedHotel]) -> BTreeMap<CityKey, (BoundingBox, usize)> {
        hotels
            .iter()
            .filter(|hotel| hotel.has_locality())
            .fold(BTreeMap::<CityKey, (BoundingBox, usize)>::new(), |mut boxes, hotel| {
                boxes
                    .entry(CityKey::new(hotel.country.clone(), hotel.city.clone()))
                    .and_modify(|(bounds, count)| {
                        *bounds = bounds.include(hotel.latitude, hotel.longitude);
                        *count += 1;
                    })
                    .or_insert((BoundingBox::from_point(hotel.latitude, hotel.longitude), 1));
                boxes
            })
    }

    pub fn compute_centroids(&self, hotels: &[ResolvedHotel]) -> Vec<CityCentroid> {
        let centroids: Vec<CityCentroid> = self
            .bounding_boxes(hotels)
            .into_iter()
            .map(|(key, (bounds, count))| CityCentroid::new(key, bounds, count))
            .collect();

        let unlocated = hotels.iter().filter(|h| !h.has_locality()).count();
        if unlocated > 0 {
            tracing::warn!("{} hotels have no city and were left out of the city centres", unlocated);
        }

        tracing::info!(
            "Computed {} city centres from {} hotels",
            centroids.len(),
            hotels.len() - unlocated
        );
        centroids
    }
}

impl Default for CentroidAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hotel(country: &str, city: &str, latitude: f64, longitude: f64) -> ResolvedHotel {
        ResolvedHotel {
            name: format!("{} hotel", city),
            country: country.to_string(),
            city: city.to_string(),
            address: String::new(),
            latitude,
            longitude,
        }
    }

    fn fixture() -> Vec<ResolvedHotel> {
        vec![
            hotel("UK", "Sallisaw", 30.0, -160.0),
            hotel("US", "Coalville", 20.0, -60.0),
            hotel("UK", "Sallisaw", 50.0, -40.0),
            hotel("US", "Coalville", 80.0, -120.0),
            hotel("US", "Coalville", 79.0, -61.0),
        ]
    }

    #[test]
    fn test_centroid_is_bounding_box_midpoint() {
        let centroids = CentroidAggregator::new().compute_centroids(&fixture());

        assert_eq!(centroids.len(), 2);
        assert_eq!(centroids[0].key, CityKey::new("UK", "Sallisaw"));
        assert_eq!(
            centroids[0].bounds,
            BoundingBox {
                min_lat: 30.0,
                max_lat: 50.0,
                min_lon: -160.0,
                max_lon: -40.0
            }
        );
        assert_eq!((centroids[0].center_lat, centroids[0].center_lon), (40.0, -100.0));

        assert_eq!(centroids[1].key, CityKey::new("US", "Coalville"));
        assert_eq!((centroids[1].center_lat, centroids[1].center_lon), (50.0, -90.0));
        assert_eq!(centroids[1].hotel_count, 3);
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let aggregator = CentroidAggregator::new();
        let forward = aggregator.compute_centroids(&fixture());

        let mut shuffled = fixture();
        shuffled.reverse();
        shuffled.push(hotel("UK", "Sallisaw", 30.0, -160.0));
        let reversed = aggregator.compute_centroids(&shuffled);

        let centres = |c: &[CityCentroid]| -> Vec<(CityKey, f64, f64)> {
            c.iter().map(|c| (c.key.clone(), c.center_lat, c.center_lon)).collect()
        };
        assert_eq!(centres(&forward), centres(&reversed));
    }

    #[test]
    fn test_same_city_name_in_two_countries_stays_separate() {
        let hotels = vec![hotel("US", "Paris", 33.66, -95.55), hotel("FR", "Paris", 48.85, 2.35)];
        let centroids = CentroidAggregator::new().compute_centroids(&hotels);
        assert_eq!(centroids.len(), 2);
        assert_eq!(centroids[0].key.country, "FR");
    }

    #[test]
    fn test_hotels_without_city_form_no_centre() {
        let mut hotels = fixture();
        hotels.push(hotel("FR", "", 50.9, 2.3));
        hotels.push(hotel("FR", "  ", 42.5, 9.1));

        let centroids = CentroidAggregator::new().compute_centroids(&hotels);

        assert_eq!(centroids.len(), 2);
        assert!(centroids.iter().all(|c| c.key.country != "FR"));
        assert_eq!(centroids[1].hotel_count, 3);
    }
}
