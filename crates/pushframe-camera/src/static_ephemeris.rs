//! Frozen-geometry ephemeris provider.

use crate::body::{Body, Frame, TargetBody};
use crate::ephemeris::{EphemerisError, EphemerisProvider};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Provider whose positions and orientations do not change with time.
///
/// All vectors are stored in the target's body-fixed frame. The spacecraft
/// frame and every instrument frame share one orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticEphemeris {
    pub target: TargetBody,
    /// Spacecraft position relative to the target centre, km.
    pub spacecraft: Vector3<f64>,
    /// Sun position relative to the target centre, km.
    pub sun: Vector3<f64>,
    /// Instrument frame → body-fixed frame.
    pub instrument_to_body: Rotation3<f64>,
    /// Body-fixed frame → J2000.
    pub body_to_j2000: Rotation3<f64>,
}

impl StaticEphemeris {
    /// Spacecraft at `spacecraft` with the boresight aimed at the body centre.
    pub fn looking_at_center(target: TargetBody, spacecraft: Vector3<f64>, sun: Vector3<f64>) -> Self {
        let dir = -spacecraft;
        let up = if dir.cross(&Vector3::z()).norm_squared() > 1e-12 * dir.norm_squared() {
            Vector3::z()
        } else {
            Vector3::x()
        };
        Self {
            target,
            spacecraft,
            sun,
            instrument_to_body: Rotation3::face_towards(&dir, &up),
            body_to_j2000: Rotation3::identity(),
        }
    }

    pub fn with_instrument_orientation(mut self, instrument_to_body: Rotation3<f64>) -> Self {
        self.instrument_to_body = instrument_to_body;
        self
    }

    pub fn with_body_to_j2000(mut self, body_to_j2000: Rotation3<f64>) -> Self {
        self.body_to_j2000 = body_to_j2000;
        self
    }

    fn body_position(&self, body: Body, et: f64) -> Result<Vector3<f64>, EphemerisError> {
        match body {
            Body::Sun => Ok(self.sun),
            Body::Spacecraft => Ok(self.spacecraft),
            Body::Target(t) if t == self.target => Ok(Vector3::zeros()),
            Body::Target(_) => Err(EphemerisError::NoData { body, et }),
        }
    }

    /// Rotation from `frame` into the body-fixed frame.
    fn to_body_fixed(&self, frame: Frame, et: f64) -> Result<Rotation3<f64>, EphemerisError> {
        match frame {
            Frame::BodyFixed(t) if t == self.target => Ok(Rotation3::identity()),
            Frame::J2000 => Ok(self.body_to_j2000.inverse()),
            Frame::Spacecraft | Frame::Instrument(_) => Ok(self.instrument_to_body),
            Frame::BodyFixed(_) => Err(EphemerisError::NoOrientation {
                from: frame,
                to: Frame::BodyFixed(self.target),
                et,
            }),
        }
    }
}

impl EphemerisProvider for StaticEphemeris {
    fn position(
        &self,
        target: Body,
        observer: Body,
        et: f64,
        frame: Frame,
    ) -> Result<Vector3<f64>, EphemerisError> {
        let rel = self.body_position(target, et)? - self.body_position(observer, et)?;
        Ok(self.to_body_fixed(frame, et)?.inverse() * rel)
    }

    fn orientation(&self, from: Frame, to: Frame, et: f64) -> Result<Rotation3<f64>, EphemerisError> {
        Ok(self.to_body_fixed(to, et)?.inverse() * self.to_body_fixed(from, et)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn juno_over_equator() -> StaticEphemeris {
        StaticEphemeris::looking_at_center(
            TargetBody::Jupiter,
            Vector3::new(200_000.0, 0.0, 0.0),
            Vector3::new(7.4e8, 0.0, 0.0),
        )
    }

    #[test]
    fn boresight_hits_sub_spacecraft_point() {
        let eph = juno_over_equator();
        let sp = eph
            .surface_ray_intercept(
                TargetBody::Jupiter,
                Body::Spacecraft,
                0.0,
                Frame::Instrument(-61502),
                &Vector3::z(),
            )
            .expect("ephemeris")
            .expect("hit");
        assert_relative_eq!(sp.position, Vector3::new(71492.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(sp.lat_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(sp.lon_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let eph = juno_over_equator();
        let sp = eph
            .surface_ray_intercept(
                TargetBody::Jupiter,
                Body::Spacecraft,
                0.0,
                Frame::Instrument(-61502),
                &-Vector3::z(),
            )
            .expect("ephemeris");
        assert!(sp.is_none());
    }

    #[test]
    fn sub_solar_point_has_zero_incidence() {
        let eph = juno_over_equator();
        let p = Vector3::new(71492.0, 0.0, 0.0);
        let ill = eph
            .illumination(TargetBody::Jupiter, Body::Spacecraft, 0.0, &p)
            .expect("ephemeris");
        assert_relative_eq!(ill.incidence, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ill.emission, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ill.phase, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn orientation_round_trips_through_j2000() {
        let eph = juno_over_equator()
            .with_body_to_j2000(Rotation3::from_axis_angle(&Vector3::z_axis(), 0.3));
        let there = eph
            .orientation(Frame::Instrument(-61501), Frame::J2000, 0.0)
            .expect("orientation");
        let back = eph
            .orientation(Frame::J2000, Frame::Instrument(-61501), 0.0)
            .expect("orientation");
        assert_relative_eq!((back * there).matrix(), Rotation3::identity().matrix(), epsilon = 1e-12);
    }

    #[test]
    fn unknown_bodies_are_errors() {
        let eph = juno_over_equator();
        assert!(matches!(
            eph.position(Body::Target(TargetBody::Io), Body::Spacecraft, 0.0, Frame::J2000),
            Err(EphemerisError::NoData { .. })
        ));
        assert!(eph
            .orientation(Frame::BodyFixed(TargetBody::Europa), Frame::J2000, 0.0)
            .is_err());
    }
}
