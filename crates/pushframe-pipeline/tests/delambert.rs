use approx::assert_relative_eq;
use nalgebra::{Rotation3, Vector3};
use pushframe_camera::{
    Body, CameraModel, ChannelCache, ChannelId, EphemerisError, EphemerisProvider, Frame, StaticEphemeris,
    TargetBody,
};
use pushframe_core::{Band, StripImage};
use pushframe_pipeline::{delambertize, lambert_factor, ExposureTiming, PipelineError, StripError};

const BAND_HEIGHT: usize = 8;

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .expect("pool")
}

fn timing() -> ExposureTiming {
    ExposureTiming::from_label(5.5e8, 5.5e8 + 20.0, 0.37)
}

/// Strip with a distinct value per sample.
fn ramp_strip(width: usize, exposures: usize) -> StripImage {
    let height = 3 * BAND_HEIGHT * exposures;
    let data = (0..width * height).map(|i| 10.0 + (i % 97) as f32).collect();
    StripImage::new(width, height, data).expect("strip")
}

#[test]
fn pixels_without_intercept_keep_unit_factor() {
    // Jupiter is a two-degree disc at this range; pixels near the strip's
    // left edge look almost thirty degrees off the boresight.
    let eph = StaticEphemeris::looking_at_center(
        TargetBody::Jupiter,
        Vector3::new(4.0e6, 0.0, 0.0),
        Vector3::new(7.4e8, 0.0, 0.0),
    );
    let cache = ChannelCache::new();
    let model = CameraModel::new(&eph, &cache, TargetBody::Jupiter);
    let strip = ramp_strip(16, 2);

    for exponent in [0.875, 0.0, 3.0] {
        let out = delambertize(&pool(), &strip, BAND_HEIGHT, &timing(), &model, exponent)
            .expect("delambert");
        assert!(out.factors.data.iter().all(|&f| f == 1.0));
        assert_eq!(out.corrected, strip);
    }
}

#[test]
fn lit_pixels_are_scaled_by_cosine_power() {
    // Close enough that every pixel of the strip sees the body.
    let eph = StaticEphemeris::looking_at_center(
        TargetBody::Jupiter,
        Vector3::new(100_000.0, 0.0, 0.0),
        Vector3::new(7.4e8, 0.0, 0.0),
    );
    let cache = ChannelCache::new();
    let model = CameraModel::new(&eph, &cache, TargetBody::Jupiter);
    let strip = ramp_strip(24, 2);
    let source = strip.clone();

    let out = delambertize(&pool(), &strip, BAND_HEIGHT, &timing(), &model, 0.875).expect("delambert");
    assert_eq!(strip, source, "source buffer must be untouched");

    for (i, (&f, (&v, &c))) in out
        .factors
        .data
        .iter()
        .zip(strip.data.iter().zip(out.corrected.data.iter()))
        .enumerate()
    {
        assert!(f > 0.0 && f < 1.0, "factor {f} at sample {i}");
        assert_relative_eq!(c, v * f, epsilon = 1e-4);
    }
}

#[test]
fn malformed_strip_is_rejected() {
    let eph = StaticEphemeris::looking_at_center(
        TargetBody::Jupiter,
        Vector3::new(4.0e6, 0.0, 0.0),
        Vector3::new(7.4e8, 0.0, 0.0),
    );
    let cache = ChannelCache::new();
    let model = CameraModel::new(&eph, &cache, TargetBody::Jupiter);
    let strip = StripImage::zeros(16, 3 * BAND_HEIGHT + 2);

    let err = delambertize(&pool(), &strip, BAND_HEIGHT, &timing(), &model, 0.875).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Strip(StripError::MalformedStrip { .. })
    ));
}

/// Fixed viewing geometry with the Sun swinging about the body's z axis at
/// `rate` degrees per second, measured from `epoch`.
struct SwingingSun {
    frozen: StaticEphemeris,
    epoch: f64,
    rate: f64,
}

impl EphemerisProvider for SwingingSun {
    fn position(&self, target: Body, observer: Body, et: f64, frame: Frame) -> Result<Vector3<f64>, EphemerisError> {
        let rel = self.frozen.position(target, observer, et, frame)?;
        if target == Body::Sun && matches!(frame, Frame::BodyFixed(_)) {
            let swing = Rotation3::from_axis_angle(&Vector3::z_axis(), (self.rate * (et - self.epoch)).to_radians());
            return Ok(swing * rel);
        }
        Ok(rel)
    }

    fn orientation(&self, from: Frame, to: Frame, et: f64) -> Result<Rotation3<f64>, EphemerisError> {
        self.frozen.orientation(from, to, et)
    }
}

#[test]
fn each_exposure_is_corrected_at_its_own_time() {
    let timing = timing();
    let eph = SwingingSun {
        frozen: StaticEphemeris::looking_at_center(
            TargetBody::Jupiter,
            Vector3::new(100_000.0, 0.0, 0.0),
            Vector3::new(7.4e8, 0.0, 0.0),
        ),
        epoch: timing.exposure_et(0),
        rate: 20.0,
    };
    let cache = ChannelCache::new();
    let model = CameraModel::new(&eph, &cache, TargetBody::Jupiter);
    let strip = ramp_strip(24, 3);

    let out = delambertize(&pool(), &strip, BAND_HEIGHT, &timing, &model, 0.875).expect("delambert");

    let (x, y) = (10, 3);
    let green = ChannelId::from(Band::Green).naif_id();
    let sampled: Vec<f32> = (0..3)
        .map(|exposure| {
            let row = (3 * exposure + Band::Green.triplet_offset()) * BAND_HEIGHT + y;
            out.factors.get(x, row).expect("factor")
        })
        .collect();

    for (exposure, &factor) in sampled.iter().enumerate() {
        let hit = model
            .intercept_for_pixel(green, timing.exposure_et(exposure), x as f64, y as f64, true)
            .expect("query")
            .expect("hit");
        let expected = lambert_factor(hit.illumination.expect("illumination").incidence, 0.875);
        assert_relative_eq!(factor as f64, expected, epsilon = 1e-6);
    }
    // the Sun moves about 7.4 degrees per exposure
    assert!((sampled[0] - sampled[1]).abs() > 1e-3, "{sampled:?}");
    assert!((sampled[1] - sampled[2]).abs() > 1e-3, "{sampled:?}");
}
