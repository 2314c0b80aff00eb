use map_3d::deg2rad;
use nalgebra::Vector3;

use crate::interp::Error;

/// Atmospheric refraction model, applied to the topocentric elevation.
/// Every model returns a correction for the reference atmosphere
/// (10 °C, 1010 hPa), the site scales it for its own conditions.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefractionModel {
    /// tan(zenith distance) series above 15°,
    /// rational approximation down to -2°.
    #[default]
    TwoRegime,
    /// Single formula from the NREL Solar Position Algorithm.
    Nrel,
    /// No refraction: geometric elevation.
    Disabled,
}

impl RefractionModel {
    /// Elevation correction (radian) for a body seen in direction `rect`
    /// (horizon frame: north, east, zenith) at geometric elevation `el_rad`.
    pub fn correction(&self, rect: &Vector3<f64>, el_rad: f64) -> f64 {
        match self {
            Self::TwoRegime => Self::two_regime(rect, el_rad),
            Self::Nrel => Self::nrel(el_rad),
            Self::Disabled => 0.0,
        }
    }
    fn two_regime(rect: &Vector3<f64>, el_rad: f64) -> f64 {
        let w = (rect[0] * rect[0] + rect[1] * rect[1]).sqrt();
        if rect[2] >= 0.268 * w {
            // above ~15°
            let tan_zd = w / rect[2];
            2.8253e-4 * tan_zd - 3.9948e-7 * tan_zd.powi(3)
        } else if el_rad > deg2rad(-2.0) {
            (8.3323e-3 + 3.1786e-2 * el_rad + 2.0746e-2 * el_rad * el_rad)
                / (1.0 + 20.995 * el_rad + 160.31 * el_rad * el_rad)
        } else {
            0.0
        }
    }
    fn nrel(el_rad: f64) -> f64 {
        if el_rad > deg2rad(-2.0) {
            0.000296706 / (el_rad + 0.00313756 / (el_rad + 0.0891863)).tan()
        } else {
            0.0
        }
    }
}

impl std::str::FromStr for RefractionModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<RefractionModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "two-regime" | "default" => Ok(RefractionModel::TwoRegime),
            "nrel" | "spa" => Ok(RefractionModel::Nrel),
            "none" | "disabled" => Ok(RefractionModel::Disabled),
            _ => Err(Error::UnknownRefractionModel(c)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::RefractionModel;
    use crate::{interp::Error, sky::polar_to_rect};
    use map_3d::deg2rad;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("nrel", RefractionModel::Nrel)]
    #[case(" SPA ", RefractionModel::Nrel)]
    #[case("two-regime", RefractionModel::TwoRegime)]
    #[case("None", RefractionModel::Disabled)]
    fn parsing(#[case] desc: &str, #[case] expected: RefractionModel) {
        assert_eq!(RefractionModel::from_str(desc), Ok(expected));
    }

    #[test]
    fn unknown_model() {
        assert_eq!(
            RefractionModel::from_str(" Saastamoinen"),
            Err(Error::UnknownRefractionModel("saastamoinen".to_string()))
        );
    }

    #[test]
    fn two_regime() {
        let model = RefractionModel::TwoRegime;

        let el = deg2rad(45.0);
        let dl = model.correction(&polar_to_rect(0.0, el), el);
        assert!((dl - (2.8253e-4 - 3.9948e-7)).abs() < 1.0E-12, "45°: {}", dl);

        let dl = model.correction(&polar_to_rect(0.0, 0.0), 0.0);
        assert!((dl - 8.3323e-3).abs() < 1.0E-12, "horizon: {}", dl);

        let el = deg2rad(-3.0);
        assert_eq!(model.correction(&polar_to_rect(0.0, el), el), 0.0);

        let el = deg2rad(90.0);
        assert!(model.correction(&polar_to_rect(0.0, el), el).abs() < 1.0E-15);
    }

    #[rstest]
    #[case(0.0)]
    #[case(10.0)]
    #[case(30.0)]
    #[case(60.0)]
    fn models_agree(#[case] el_deg: f64) {
        // both models describe the same atmosphere within a few arcseconds
        let el = deg2rad(el_deg);
        let rect = polar_to_rect(1.0, el);
        let a = RefractionModel::TwoRegime.correction(&rect, el);
        let b = RefractionModel::Nrel.correction(&rect, el);
        let tolerance_arcsec = match el_deg {
            el if el < 5.0 => 360.0,
            el if el < 15.0 => 30.0,
            _ => 10.0,
        };
        let tolerance = deg2rad(tolerance_arcsec / 3600.0);
        assert!((a - b).abs() < tolerance, "{}°: {} / {}", el_deg, a, b);
        assert!(a > 0.0 && b > 0.0);
        assert_eq!(RefractionModel::Disabled.correction(&rect, el), 0.0);
    }
}
