//! Observing site geometry: from the terrestrial frame to horizon coordinates
mod refraction;

pub use refraction::RefractionModel;

use hifitime::{Duration, Unit};
use map_3d::{deg2rad, geodetic2ecef, rad2deg, Ellipsoid};
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::sky::{polar_to_rect, rect_to_polar, rotation_matrix, Axis};

/// Flattening of the reference ellipsoid (NREL SPA)
const FLATTENING: f64 = 1.0 - 0.99664719;
/// Equatorial radius (km)
const EQUATORIAL_RADIUS_KM: f64 = 6378.140;
/// Astronomical unit (km), implied by a solar parallax of 8.794"
const AU_KM: f64 = 1.4960039e8;
/// Speed of light (km/s)
const SPEED_OF_LIGHT_KM_S: f64 = 299792.458;
/// Mean earth rotation rate (rad/s)
const EARTH_ROTATION_RAD_S: f64 = 7.292115e-5;
/// Squared eccentricity of the ellipsoid
const ECCENTRICITY_SQ: f64 = 2.0 * FLATTENING - FLATTENING * FLATTENING;

/// Position of a body as seen from a [Site]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Horizon {
    /// Azimuth, clockwise from North, in [0, 2pi) (radian)
    pub azimuth_rad: f64,
    /// Elevation above the horizon, refraction included (radian)
    pub elevation_rad: f64,
    /// Unit vector (north, east, zenith). Left handed, like the angles.
    pub rect: Vector3<f64>,
}

impl Horizon {
    /// Builds [Horizon] from azimuth and elevation (radian)
    pub fn new(azimuth_rad: f64, elevation_rad: f64) -> Self {
        let azimuth_rad = azimuth_rad.rem_euclid(TAU);
        Self {
            azimuth_rad,
            elevation_rad,
            rect: polar_to_rect(azimuth_rad, elevation_rad),
        }
    }
    /// Azimuth in decimal degrees
    pub fn azimuth_deg(&self) -> f64 {
        rad2deg(self.azimuth_rad)
    }
    /// Elevation in decimal degrees
    pub fn elevation_deg(&self) -> f64 {
        rad2deg(self.elevation_rad)
    }
}

/// A surface (solar panel...) whose incidence angle we are interested in
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Surface {
    /// Orientation of the normal to the surface
    pub normal: Horizon,
}

impl Surface {
    /// Builds a [Surface] from the azimuth of its normal and its slope
    /// from the horizontal (= zenith distance of the normal), in degrees.
    pub fn new(azimuth_deg: f64, slope_deg: f64) -> Self {
        Self {
            normal: Horizon::new(deg2rad(azimuth_deg), deg2rad(90.0 - slope_deg)),
        }
    }
    /// Incidence angle (radian) of rays coming from `body`.
    /// Both directions must be unit vectors.
    pub fn incidence(&self, body: &Horizon) -> f64 {
        assert!(
            (body.rect.norm_squared() - 1.0).abs() < 1.0E-10,
            "body direction is not a unit vector"
        );
        assert!(
            (self.normal.rect.norm_squared() - 1.0).abs() < 1.0E-10,
            "surface normal is not a unit vector"
        );
        body.rect.dot(&self.normal.rect).clamp(-1.0, 1.0).acos()
    }
}

/// Observing site. Holds every site related quantity that does not
/// change with time, so the per-tick transform is a rotation,
/// a vector addition and a refraction estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Astronomical latitude (radian)
    ast_lat_rad: f64,
    /// Astronomical longitude (radian)
    ast_lon_rad: f64,
    /// Geodetic coordinates (latitude [rad], longitude [rad], height [m])
    geodetic: Vector3<f64>,
    /// Geocentric radius (km)
    geoc_radius_km: f64,
    /// Geocentric parallax term, north component (AU)
    rho_sin_au: f64,
    /// Geocentric parallax term, zenith component (AU)
    rho_cos_au: f64,
    /// Diurnal aberration, east component (radian).
    /// Computed but not applied by [Site::tirs_to_topo].
    diurnal_aberration: f64,
    /// Pressure & temperature refraction scaling
    refraction_pt: f64,
    refraction: RefractionModel,
    timezone: Duration,
    /// Pole coordinates (xp, yp) in radians, when corrected for
    polar_motion: Option<(f64, f64)>,
    /// TIRS to horizon frame, polar motion neglected
    az_el_base: Matrix3<f64>,
    /// TIRS to horizon frame, in use
    az_el: Matrix3<f64>,
    /// Horizon frame to hour angle / declination frame
    ha_dec: Matrix3<f64>,
}

impl Site {
    /// Builds a [Site] from geodetic (GPS) latitude & longitude (degrees)
    /// and height above the ellipsoid (meters), used as astronomical
    /// coordinates as well.
    /// Refraction defaults to 10 °C, 1010 hPa and the time zone to UTC.
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_m: f64) -> Self {
        Self::with_astronomical(
            latitude_deg,
            longitude_deg,
            latitude_deg,
            longitude_deg,
            height_m,
        )
    }
    /// Builds a [Site] distinguishing astronomical coordinates (local vertical,
    /// used for the horizon frame) from geodetic coordinates (used for parallax).
    pub fn with_astronomical(
        ast_lat_deg: f64,
        ast_lon_deg: f64,
        geod_lat_deg: f64,
        geod_lon_deg: f64,
        height_m: f64,
    ) -> Self {
        let ast_lat_rad = deg2rad(ast_lat_deg);
        let ast_lon_rad = deg2rad(ast_lon_deg);
        let geod_lat_rad = deg2rad(geod_lat_deg);
        let geod_lon_rad = deg2rad(geod_lon_deg);
        let height_km = height_m / 1000.0;

        let (sin_phi, cos_phi) = geod_lat_rad.sin_cos();
        let inv_c = (1.0 - ECCENTRICITY_SQ * sin_phi * sin_phi).sqrt();
        let ae_c_km = EQUATORIAL_RADIUS_KM / inv_c;
        let kc = (1.0 - ECCENTRICITY_SQ * (2.0 - ECCENTRICITY_SQ) * sin_phi * sin_phi).sqrt();
        let geoc_radius_km = ae_c_km * kc + height_km;

        // parallax offsets along north (x) and zenith (z)
        let rho_sin_au = ae_c_km * ECCENTRICITY_SQ * sin_phi * cos_phi / AU_KM;
        let rho_cos_au = -(EQUATORIAL_RADIUS_KM * inv_c + height_km) / AU_KM;

        let rho_cos_phi_km = (ae_c_km + height_km) * cos_phi;
        let diurnal_aberration = EARTH_ROTATION_RAD_S * rho_cos_phi_km / SPEED_OF_LIGHT_KM_S;

        let ha_dec =
            rotation_matrix(Axis::Z, PI) * rotation_matrix(Axis::Y, FRAC_PI_2 - ast_lat_rad);

        let az_el = Self::az_el_matrix(ast_lat_rad, ast_lon_rad);

        Self {
            ast_lat_rad,
            ast_lon_rad,
            geodetic: Vector3::new(geod_lat_rad, geod_lon_rad, height_m),
            geoc_radius_km,
            rho_sin_au,
            rho_cos_au,
            diurnal_aberration,
            refraction_pt: 1.0,
            refraction: RefractionModel::default(),
            timezone: Duration::ZERO,
            polar_motion: None,
            az_el_base: az_el,
            az_el,
            ha_dec,
        }
    }
    /// TIRS (x: 0° lat 0° long, y: 0° lat 90° E, z: pole) to horizon
    /// (x: north, y: east, z: zenith) rotation. Rotation about Z by the
    /// longitude, about Y' by minus the latitude, then swap of X'' and Z''.
    fn az_el_matrix(lat_rad: f64, lon_rad: f64) -> Matrix3<f64> {
        let (sin_lon, cos_lon) = lon_rad.sin_cos();
        let (sin_lat, cos_lat) = lat_rad.sin_cos();
        Matrix3::new(
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            -sin_lon,
            cos_lon,
            0.0,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }
    /// Updates the refraction coefficient from the average air temperature (°C)
    /// and pressure (hPa) at the site.
    pub fn set_temperature_pressure(&mut self, temperature_c: f64, pressure_hpa: f64) {
        assert!(
            temperature_c > -100.0,
            "invalid site temperature {}°C",
            temperature_c
        );
        let t = 283.0 / (273.0 + temperature_c);
        let p = pressure_hpa / 1010.0;
        self.refraction_pt = p * t;
    }
    /// Accounts for polar motion, from the pole coordinates `xp_rad`, `yp_rad`
    /// published by the IERS. A tiny effect (< 0.5"), which changes slowly:
    /// updating it once per day is more than enough. Passing `None` reverts
    /// to the uncorrected horizon frame.
    pub fn set_polar_motion(&mut self, pole: Option<(f64, f64)>) {
        self.polar_motion = pole;
        self.az_el = match pole {
            Some((xp_rad, yp_rad)) => {
                // TIRS to ITRS, the TIO locator s' is neglected
                let w = rotation_matrix(Axis::X, -yp_rad) * rotation_matrix(Axis::Y, -xp_rad);
                self.az_el_base * w
            },
            None => self.az_el_base,
        };
    }
    /// Pole coordinates (xp, yp) in radians, if corrected for
    pub fn polar_motion(&self) -> Option<(f64, f64)> {
        self.polar_motion
    }
    /// Selects the [RefractionModel]
    pub fn set_refraction_model(&mut self, model: RefractionModel) {
        self.refraction = model;
    }
    /// Sets the time zone offset, in hours east of Greenwich
    pub fn set_timezone(&mut self, hours: f64) {
        self.timezone = hours * Unit::Hour;
    }
    /// Time zone offset
    pub fn timezone(&self) -> Duration {
        self.timezone
    }
    /// Refraction scaling for the site atmosphere (1.0 for 10 °C, 1010 hPa)
    pub fn refraction_coefficient(&self) -> f64 {
        self.refraction_pt
    }
    /// Astronomical (latitude, longitude) in radians
    pub fn astronomical_rad(&self) -> (f64, f64) {
        (self.ast_lat_rad, self.ast_lon_rad)
    }
    /// Geodetic coordinates (latitude [ddeg], longitude [ddeg], height [m])
    pub fn geodetic_ddeg(&self) -> Vector3<f64> {
        Vector3::new(
            rad2deg(self.geodetic[0]),
            rad2deg(self.geodetic[1]),
            self.geodetic[2],
        )
    }
    /// Site position in ECEF [m], WGS84
    pub fn ecef(&self) -> Vector3<f64> {
        let (x, y, z) = geodetic2ecef(
            self.geodetic[0],
            self.geodetic[1],
            self.geodetic[2],
            Ellipsoid::WGS84,
        );
        Vector3::new(x, y, z)
    }
    /// Distance to the center of the Earth (km)
    pub fn geocentric_radius_km(&self) -> f64 {
        self.geoc_radius_km
    }
    /// Diurnal aberration coefficient (radian)
    pub fn diurnal_aberration(&self) -> f64 {
        self.diurnal_aberration
    }
    /// Converts a TIRS direction into topocentric horizon coordinates:
    /// horizon frame rotation, geocentric parallax and refraction.
    /// `distance_au`: geocentric distance, 0.0 for infinitely far bodies.
    /// Call this on every control loop iteration, once per site.
    pub fn tirs_to_topo(&self, tirs: &Vector3<f64>, distance_au: f64) -> Horizon {
        // still a geocentric point of view
        let mut rect = self.az_el * tirs;

        // deflection of the vertical is neglected here
        if distance_au > 0.0 {
            rect[0] += self.rho_sin_au / distance_au;
            rect[2] += self.rho_cos_au / distance_au;
        }

        let (azimuth_rad, elevation_rad) = rect_to_polar(&rect);
        let d_el = self.refraction.correction(&rect, elevation_rad) * self.refraction_pt;
        Horizon::new(azimuth_rad, elevation_rad + d_el)
    }
    /// Observed (refracted) hour angle and declination, in radians,
    /// of a body seen at `topo`.
    pub fn az_el_to_ha_dec(&self, topo: &Horizon) -> (f64, f64) {
        rect_to_polar(&(self.ha_dec * topo.rect))
    }
}
