//! End-to-end swap-rate scenarios on a five-year annual tenor.

use approx::assert_abs_diff_eq;
use lmm_core::{DiscountCurve, ForwardCurve, StubPlacement, TimeGrid};
use lmm_engine::{
    BrownianMotion, DiscretisationScheme, ExponentialForm5Param, LmmConfig, LmmSimulation,
};
use lmm_products::{
    ModelledMarketQuantity, Product, RiskClass, SimmCoordinate, SimpleSwap, SwapMarketRateProduct,
};

const FORWARD_TIMES: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
const FORWARDS: [f64; 5] = [0.01, 0.03, 0.025, 0.02, 0.015];
const DISCOUNT_TIMES: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
const DISCOUNT_FACTORS: [f64; 5] = [0.98, 0.95, 0.94, 0.92, 0.9];

fn build_simulation(paths: usize, scheme: DiscretisationScheme) -> LmmSimulation {
    let tenor = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
    let fine = TimeGrid::new(0.0, 5.0, 0.1, StubPlacement::AtEnd).unwrap();
    let process = tenor.union(&fine);

    let forward_curve = ForwardCurve::from_forwards(
        "EUR-12M",
        FORWARD_TIMES.to_vec(),
        FORWARDS.to_vec(),
        1.0,
    )
    .unwrap();
    let discount_curve = DiscountCurve::from_discount_factors(
        "EUR-OIS",
        DISCOUNT_TIMES.to_vec(),
        DISCOUNT_FACTORS.to_vec(),
    )
    .unwrap();
    let covariance =
        ExponentialForm5Param::new(&process, &tenor, 1, [0.1, 0.1, 0.1, 0.1, 0.1]).unwrap();
    let brownian = BrownianMotion::new(&process, 1, paths, 42).unwrap();

    let config = LmmConfig::builder()
        .tenor(tenor)
        .process(process)
        .forward_curve(forward_curve)
        .discount_curve(discount_curve)
        .covariance(covariance)
        .brownian(brownian)
        .scheme(scheme)
        .build()
        .unwrap();
    LmmSimulation::new(config).unwrap()
}

fn annual_schedule() -> TimeGrid {
    TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap()
}

/// Par rate implied directly by the initial curves,
/// `sum L_i tau df(T_i^pay) / sum tau df(T_j^pay)`.
fn analytic_par_rate() -> f64 {
    let float: f64 = FORWARDS
        .iter()
        .zip(&DISCOUNT_FACTORS)
        .map(|(forward, df)| forward * df)
        .sum();
    let annuity: f64 = DISCOUNT_FACTORS.iter().sum();
    float / annuity
}

#[test]
fn test_time_zero_par_rate_matches_the_curves() {
    let simulation = build_simulation(10_000, DiscretisationScheme::Euler);
    let product = SwapMarketRateProduct::new(annual_schedule(), annual_schedule());

    let par = product.value(0.0, &simulation).unwrap();
    assert_abs_diff_eq!(par.average(), analytic_par_rate(), epsilon = 1e-3);
}

#[test]
fn test_par_rate_makes_the_swap_worthless() {
    let simulation = build_simulation(10_000, DiscretisationScheme::PredictorCorrector);
    let schedule = annual_schedule();

    let par = SwapMarketRateProduct::new(schedule.clone(), schedule.clone())
        .value(0.0, &simulation)
        .unwrap();
    let swap = SimpleSwap::new(schedule, par.average(), 1.0);

    // Valued on the same path ensemble the par rate was read from.
    let value = swap.value(0.0, &simulation).unwrap();
    assert_abs_diff_eq!(value.average(), 0.0, epsilon = 1e-3);
}

#[test]
fn test_par_rate_is_reproducible_across_runs() {
    let a = build_simulation(1_000, DiscretisationScheme::Euler);
    let b = build_simulation(1_000, DiscretisationScheme::Euler);
    let product = SwapMarketRateProduct::new(annual_schedule(), annual_schedule());

    let par_a = product.value(2.0, &a).unwrap();
    let par_b = product.value(2.0, &b).unwrap();
    assert_eq!(par_a.values(), par_b.values());
}

#[test]
fn test_exhausted_fixed_leg_is_a_domain_error() {
    let simulation = build_simulation(100, DiscretisationScheme::Euler);
    let float_leg = annual_schedule();
    let fixed_leg = TimeGrid::new(0.0, 1.0, 1.0, StubPlacement::AtEnd).unwrap();
    let product = SwapMarketRateProduct::new(float_leg, fixed_leg);

    let err = product.value(2.0, &simulation).unwrap_err();
    assert!(err.is_empty_schedule());
    assert!(err.to_string().contains("fixed leg"));
    // Both legs exhausted reports the floating leg first.
    let err = SwapMarketRateProduct::new(annual_schedule(), annual_schedule())
        .value(5.0, &simulation)
        .unwrap_err();
    assert!(err.to_string().contains("floating leg"));
}

#[test]
fn test_modelled_quantity_matches_the_explicit_product() {
    let simulation = build_simulation(1_000, DiscretisationScheme::Euler);
    let coordinate = SimmCoordinate::new(RiskClass::InterestRate, "EUR", "5Y");
    let quantity = ModelledMarketQuantity::swap_rate(coordinate, 5.0, 1.0, 1.0);

    let via_quantity = quantity.value(0.0, &simulation).unwrap();
    let via_product = SwapMarketRateProduct::new(annual_schedule(), annual_schedule())
        .value(0.0, &simulation)
        .unwrap();
    assert_eq!(via_quantity.values(), via_product.values());
    assert_eq!(quantity.coordinate().to_string(), "IR:EUR:5Y");
}

#[test]
fn test_seasoned_par_rate_stays_in_a_plausible_band() {
    let simulation = build_simulation(1_000, DiscretisationScheme::Euler);
    let product = SwapMarketRateProduct::new(annual_schedule(), annual_schedule());

    let par = product.value(2.0, &simulation).unwrap();
    assert_eq!(par.number_of_paths(), 1_000);
    for path in 0..par.number_of_paths() {
        let rate = par.get(path);
        assert!(rate.is_finite());
        assert!(rate > 0.0 && rate < 0.5, "implausible par rate {rate}");
    }
    assert!(par.standard_error() > 0.0);
}
