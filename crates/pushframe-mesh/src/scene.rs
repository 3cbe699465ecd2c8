//! Scene description for rendering a projected mosaic on its body mesh.

use crate::error::MeshError;
use pushframe_camera::{time, Body, ChannelId, EphemerisProvider, Frame, TargetBody};
use pushframe_core::CoordinateExtent;
use pushframe_pipeline::{AcquisitionMetadata, ExposureTiming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Timing, map window and viewing geometry of one acquisition.
///
/// Times are ephemeris seconds; the spacecraft location is body-fixed and
/// multiplied by `scalar`, matching the exported mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub target: TargetBody,
    #[serde(default)]
    pub image_time: Option<String>,
    pub interframe_delay: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub middle_time: f64,
    /// `middle_time` as UTC.
    pub middle_time_utc: String,
    pub latitude_minimum: f64,
    pub latitude_maximum: f64,
    pub longitude_minimum: f64,
    pub longitude_maximum: f64,
    pub scalar: f64,
    pub spacecraft_location: [f64; 3],
    /// Camera → body-fixed rotation as XYZ Euler angles, degrees.
    pub instrument_orientation: [f64; 3],
}

impl SceneDescription {
    /// Sample `provider` at the middle of the acquisition window.
    pub fn build<P: EphemerisProvider + ?Sized>(
        provider: &P,
        target: TargetBody,
        timing: &ExposureTiming,
        image_time: Option<String>,
        window: &CoordinateExtent,
        scalar: f64,
    ) -> Result<Self, MeshError> {
        let mid = timing.mid_et();
        let body_fixed = Frame::BodyFixed(target);
        let spacecraft = spacecraft_location(provider, target, mid, scalar)?;
        let orientation = provider.orientation(
            Frame::Instrument(ChannelId::Full.naif_id()),
            body_fixed,
            mid,
        )?;
        let (rx, ry, rz) = orientation.euler_angles();

        Ok(Self {
            target,
            image_time,
            interframe_delay: timing.interframe_delay,
            start_time: timing.start_et,
            stop_time: timing.stop_et,
            middle_time: mid,
            middle_time_utc: time::et_to_utc(mid),
            latitude_minimum: window.min_lat,
            latitude_maximum: window.max_lat,
            longitude_minimum: window.min_lon,
            longitude_maximum: window.max_lon,
            scalar,
            spacecraft_location: spacecraft,
            instrument_orientation: [rx.to_degrees(), ry.to_degrees(), rz.to_degrees()],
        })
    }

    pub fn window(&self) -> CoordinateExtent {
        CoordinateExtent::new(
            self.latitude_minimum,
            self.latitude_maximum,
            self.longitude_minimum,
            self.longitude_maximum,
        )
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Body-fixed spacecraft position at `et`, multiplied by `scalar`.
fn spacecraft_location<P: EphemerisProvider + ?Sized>(
    provider: &P,
    target: TargetBody,
    et: f64,
    scalar: f64,
) -> Result<[f64; 3], MeshError> {
    let p = provider.position(Body::Spacecraft, Body::Target(target), et, Frame::BodyFixed(target))? * scalar;
    Ok([p.x, p.y, p.z])
}

/// Spacecraft track over `[start_et, stop_et]`, sampled at `samples` evenly
/// spaced instants including both ends. Positions are body-fixed and scaled
/// like [`SceneDescription::spacecraft_location`].
pub fn spacecraft_path<P: EphemerisProvider + ?Sized>(
    provider: &P,
    target: TargetBody,
    start_et: f64,
    stop_et: f64,
    samples: usize,
    scalar: f64,
) -> Result<Vec<[f64; 3]>, MeshError> {
    if samples < 2 || !(stop_et > start_et) {
        return Err(MeshError::InvalidPath {
            start_et,
            stop_et,
            samples,
        });
    }
    let step = (stop_et - start_et) / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let et = if i + 1 == samples {
                stop_et
            } else {
                start_et + i as f64 * step
            };
            spacecraft_location(provider, target, et, scalar)
        })
        .collect()
}

/// Where the spacecraft was when one product was imaged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraStop {
    pub name: String,
    pub et: f64,
    pub location: [f64; 3],
}

/// One [`CameraStop`] per acquisition, at its `IMAGE_TIME` (start time when
/// the label has none). Stops are named by product id.
pub fn camera_stops<'a, P, I>(provider: &P, target: TargetBody, acquisitions: I, scalar: f64) -> Result<Vec<CameraStop>, MeshError>
where
    P: EphemerisProvider + ?Sized,
    I: IntoIterator<Item = &'a AcquisitionMetadata>,
{
    acquisitions
        .into_iter()
        .map(|meta| {
            let utc = meta.image_time.as_deref().unwrap_or(&meta.start_time);
            let et = provider.utc_to_et(utc)?;
            Ok(CameraStop {
                name: meta.product_id.clone().unwrap_or_else(|| utc.to_string()),
                et,
                location: spacecraft_location(provider, target, et, scalar)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Vector3};
    use pushframe_camera::{EphemerisError, StaticEphemeris};

    #[test]
    fn samples_geometry_at_mid_time() {
        let orientation = Rotation3::from_euler_angles(0.1, -0.2, 0.3);
        let eph = StaticEphemeris::looking_at_center(
            TargetBody::Jupiter,
            Vector3::new(1.0e5, 2.0e4, -3.0e4),
            Vector3::new(7.4e8, 0.0, 0.0),
        )
        .with_instrument_orientation(orientation);
        let timing = ExposureTiming::from_label(5.5e8, 5.5e8 + 30.0, 0.37);
        let window = CoordinateExtent::new(-20.0, 35.0, 120.0, 180.0);

        let scene = SceneDescription::build(
            &eph,
            TargetBody::Jupiter,
            &timing,
            Some("2017-05-19T06:53:05.389".into()),
            &window,
            0.01,
        )
        .expect("scene");

        assert_relative_eq!(scene.middle_time, 5.5e8 + 15.06188, epsilon = 1e-6);
        assert_relative_eq!(scene.interframe_delay, 0.371);
        assert_eq!(scene.window(), window);
        assert_relative_eq!(scene.spacecraft_location[0], 1000.0, epsilon = 1e-9);
        assert_relative_eq!(scene.spacecraft_location[2], -300.0, epsilon = 1e-9);
        assert_relative_eq!(scene.instrument_orientation[0], 0.1f64.to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(scene.instrument_orientation[1], -0.2f64.to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(scene.instrument_orientation[2], 0.3f64.to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn json_round_trip() {
        let eph = StaticEphemeris::looking_at_center(
            TargetBody::Europa,
            Vector3::new(0.0, 0.0, 5.0e3),
            Vector3::new(7.4e8, 0.0, 0.0),
        );
        let timing = ExposureTiming::from_label(0.0, 10.0, 0.2);
        let scene = SceneDescription::build(
            &eph,
            TargetBody::Europa,
            &timing,
            None,
            &CoordinateExtent::new(-90.0, 90.0, -180.0, 180.0),
            1.0,
        )
        .expect("scene");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scene.json");
        scene.write_json(&path).expect("write");
        assert_eq!(SceneDescription::load_json(&path).expect("load"), scene);
    }

    /// Spacecraft moving along +x at 10 km/s from 1000 km, Sun fixed.
    struct Flyby;

    impl EphemerisProvider for Flyby {
        fn position(&self, target: Body, observer: Body, et: f64, _frame: Frame) -> Result<Vector3<f64>, EphemerisError> {
            let at = |b: Body| match b {
                Body::Spacecraft => Vector3::new(1000.0 + 10.0 * et, 0.0, 500.0),
                Body::Sun => Vector3::new(7.4e8, 0.0, 0.0),
                Body::Target(_) => Vector3::zeros(),
            };
            Ok(at(target) - at(observer))
        }

        fn orientation(&self, _: Frame, _: Frame, _: f64) -> Result<Rotation3<f64>, EphemerisError> {
            Ok(Rotation3::identity())
        }
    }

    #[test]
    fn path_samples_both_ends_evenly() {
        let path = spacecraft_path(&Flyby, TargetBody::Jupiter, 0.0, 30.0, 4, 0.5).expect("path");
        let xs: Vec<f64> = path.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![500.0, 550.0, 600.0, 650.0]);
        assert!(path.iter().all(|p| p[2] == 250.0));

        assert!(matches!(
            spacecraft_path(&Flyby, TargetBody::Jupiter, 0.0, 30.0, 1, 1.0),
            Err(MeshError::InvalidPath { samples: 1, .. })
        ));
        assert!(spacecraft_path(&Flyby, TargetBody::Jupiter, 30.0, 0.0, 10, 1.0).is_err());
    }

    #[test]
    fn camera_stops_use_image_time_and_product_id() {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("SPACECRAFT_NAME".to_string(), "JUNO".to_string());
        fields.insert("TARGET_NAME".to_string(), "JUPITER".to_string());
        fields.insert("START_TIME".to_string(), "2000-01-01T12:00:00".to_string());
        fields.insert("IMAGE_TIME".to_string(), "2000-01-01T12:00:10".to_string());
        fields.insert("INTERFRAME_DELAY".to_string(), "0.371".to_string());
        fields.insert("PRODUCT_ID".to_string(), "JNCE_A".to_string());
        let first = AcquisitionMetadata::from_reader(&fields).expect("metadata");
        fields.remove("IMAGE_TIME");
        fields.remove("PRODUCT_ID");
        let second = AcquisitionMetadata::from_reader(&fields).expect("metadata");

        let stops = camera_stops(&Flyby, TargetBody::Jupiter, [&first, &second], 1.0).expect("stops");
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].name, "JNCE_A");
        assert_eq!(stops[1].name, "2000-01-01T12:00:00");
        // ten seconds apart on the clock, 100 km apart on the track
        assert_relative_eq!(stops[0].et - stops[1].et, 10.0, epsilon = 1e-6);
        assert_relative_eq!(stops[0].location[0] - stops[1].location[0], 100.0, epsilon = 1e-6);
        assert_relative_eq!(stops[1].location[0], 1000.0 + 10.0 * stops[1].et, epsilon = 1e-6);
    }
}
