use numspin::{
    EnvironmentProfile, Error, KEY_CODE_DOWN, KEY_CODE_UP, Page, Result, TargetProperty,
};

fn emulated_page(html: &str) -> Result<Page> {
    Page::from_html_with_profile(html, EnvironmentProfile::modern_without_number_input())
}

#[test]
fn activation_is_idempotent_per_field() -> Result<()> {
    let mut page = emulated_page(
        "<form id='f'>
            <input id='a' type='number'>
            <input id='b' type='number'>
         </form>",
    )?;

    page.activate("#f")?;
    page.activate("#f")?;

    assert_eq!(page.query_count(".numspin-arrows")?, 2);
    assert_eq!(page.query_count(".numspin-up")?, 2);
    assert_eq!(page.query_count(".numspin-down")?, 2);
    assert_eq!(
        page.attr("#a", "data-numspin-activated")?,
        Some("true".to_string())
    );
    Ok(())
}

#[test]
fn native_support_short_circuits_activation() -> Result<()> {
    let mut page = Page::from_html("<form id='f'><input id='a' type='number'></form>")?;
    assert!(page.supports_native_number());

    page.activate("#f")?;
    assert_eq!(page.query_count(".numspin-arrows")?, 0);
    assert_eq!(page.attr("#a", "data-numspin-activated")?, None);

    // Without augmentation the arrow keys do nothing through this system.
    let event = page.key_down("#a", KEY_CODE_UP)?;
    assert!(!event.default_suppressed());
    page.assert_value("#a", "")?;
    Ok(())
}

#[test]
fn only_number_typed_controls_are_activated() -> Result<()> {
    let mut page = emulated_page(
        "<form id='f'>
            <input id='a' type='number'>
            <input id='b' type='text'>
            <input id='c'>
            <select id='d'></select>
            <span id='e' type='number'>not a control</span>
         </form>",
    )?;
    page.activate("#f")?;
    assert_eq!(page.query_count(".numspin-arrows")?, 1);
    Ok(())
}

#[test]
fn activation_of_an_empty_container_is_a_no_op() -> Result<()> {
    let mut page = emulated_page("<form id='f'></form>")?;
    page.activate("#f")?;
    page.activate("#f")?;
    assert_eq!(page.query_count(".numspin-arrows")?, 0);
    Ok(())
}

#[test]
fn arrow_keys_adjust_an_activated_field_and_suppress_the_default() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='4'></form>")?;
    page.activate("#f")?;

    let event = page.key_down("#qty", KEY_CODE_UP)?;
    assert!(event.default_suppressed());
    page.assert_value("#qty", "5")?;

    let event = page.key_down("#qty", KEY_CODE_DOWN)?;
    assert!(event.default_suppressed());
    page.assert_value("#qty", "4")?;
    Ok(())
}

#[test]
fn adjustment_clamps_into_the_min_max_range() -> Result<()> {
    let mut page = emulated_page(
        "<form id='f'><input id='qty' type='number' value='9' min='0' max='10' step='5'></form>",
    )?;
    page.activate("#f")?;

    page.key_down("#qty", KEY_CODE_UP)?;
    page.assert_value("#qty", "10")?;

    // Already at the bound: stepping up again stays put.
    page.key_down("#qty", KEY_CODE_UP)?;
    page.assert_value("#qty", "10")?;
    Ok(())
}

#[test]
fn off_grid_values_snap_to_the_next_step_boundary() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='3' step='5'></form>")?;
    page.activate("#f")?;

    page.pointer_down(".numspin-up")?;
    page.pointer_up()?;
    page.assert_value("#qty", "5")?;

    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='7' step='5'></form>")?;
    page.activate("#f")?;

    page.pointer_down(".numspin-down")?;
    page.pointer_up()?;
    page.assert_value("#qty", "5")?;
    Ok(())
}

#[test]
fn fractional_steps_write_back_minimal_precision() -> Result<()> {
    let mut page = emulated_page(
        "<form id='f'><input id='qty' type='number' value='1.25' step='0.25'></form>",
    )?;
    page.activate("#f")?;

    page.key_down("#qty", KEY_CODE_UP)?;
    page.assert_value("#qty", "1.5")?;
    Ok(())
}

#[test]
fn held_pointer_repeats_after_the_initial_delay() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='0'></form>")?;
    page.activate("#f")?;

    page.pointer_down(".numspin-up")?;
    page.assert_value("#qty", "1")?;

    // The first repeat waits out the full initial delay.
    page.advance_time(749)?;
    page.assert_value("#qty", "1")?;
    page.advance_time(1)?;
    page.assert_value("#qty", "2")?;

    // After that the fast cadence takes over.
    page.advance_time(100)?;
    page.assert_value("#qty", "3")?;
    page.advance_time(100)?;
    page.assert_value("#qty", "4")?;

    page.pointer_up()?;
    page.advance_time(1_000)?;
    page.assert_value("#qty", "4")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn release_before_the_first_tick_stops_all_future_adjustment() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='0'></form>")?;
    page.activate("#f")?;

    page.pointer_down(".numspin-up")?;
    page.assert_value("#qty", "1")?;
    assert_eq!(page.pending_timers().len(), 1);

    // Release lands before the scheduled tick; the tick still fires but
    // finds the session cleared.
    page.pointer_up()?;
    page.advance_time(750)?;
    page.assert_value("#qty", "1")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn release_anywhere_ends_the_session() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='0'></form>")?;
    page.activate("#f")?;

    page.pointer_down(".numspin-down")?;
    page.advance_time(750)?;
    page.assert_value("#qty", "-2")?;

    // The release gesture carries no originating element at all.
    page.pointer_up()?;
    page.advance_time(10_000)?;
    page.assert_value("#qty", "-2")?;
    Ok(())
}

#[test]
fn pressing_an_arrow_of_an_unactivated_field_does_nothing() -> Result<()> {
    // Build the markup an affordance would produce, but without the marker.
    let mut page = emulated_page(
        "<form id='f'>
            <span class='numspin-arrows'><span class='numspin-up'>\u{25B2}</span></span>
            <input id='qty' type='number' value='0'>
         </form>",
    )?;

    page.pointer_down(".numspin-up")?;
    page.assert_value("#qty", "0")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn legacy_host_profile_works_end_to_end() -> Result<()> {
    let mut page = Page::from_html_with_profile(
        "<form id='f'><input id='qty' type='number' value='0' step='2'></form>",
        EnvironmentProfile::legacy(),
    )?;
    assert!(!page.supports_native_number());
    page.activate("#f")?;

    // Suppression happens through the legacy returnValue mechanism.
    let event = page.key_down("#qty", KEY_CODE_UP)?;
    assert!(!event.default_prevented);
    assert!(event.default_suppressed());
    page.assert_value("#qty", "2")?;

    page.pointer_down(".numspin-up")?;
    page.assert_value("#qty", "4")?;
    page.advance_time(750)?;
    page.assert_value("#qty", "6")?;
    page.pointer_up()?;
    page.advance_time(1_000)?;
    page.assert_value("#qty", "6")?;
    Ok(())
}

#[test]
fn host_without_event_targets_fails_interaction_but_not_release() -> Result<()> {
    let profile = EnvironmentProfile {
        target_property: TargetProperty::Neither,
        ..EnvironmentProfile::modern_without_number_input()
    };
    let mut page = Page::from_html_with_profile(
        "<form id='f'><input id='qty' type='number' value='0'></form>",
        profile,
    )?;
    page.activate("#f")?;

    assert!(matches!(
        page.key_down("#qty", KEY_CODE_UP),
        Err(Error::UnsupportedEnvironment(_))
    ));
    assert!(matches!(
        page.pointer_down(".numspin-up"),
        Err(Error::UnsupportedEnvironment(_))
    ));
    page.assert_value("#qty", "0")?;

    // The release handler ignores the event, so it still succeeds.
    page.pointer_up()?;
    Ok(())
}

#[test]
fn gestures_and_timers_leave_a_trace() -> Result<()> {
    let mut page =
        emulated_page("<form id='f'><input id='qty' type='number' value='0'></form>")?;
    page.activate("#f")?;
    page.pointer_down(".numspin-up")?;
    page.advance_time(750)?;
    page.pointer_up()?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[spin] activated")));
    assert!(logs.iter().any(|line| line.starts_with("[spin] repeat start")));
    assert!(logs.iter().any(|line| line.starts_with("[spin] adjust")));
    assert!(logs.iter().any(|line| line.starts_with("[timer] advance")));
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn empty_and_malformed_field_text_degrades_to_defaults() -> Result<()> {
    let mut page = emulated_page(
        "<form id='f'><input id='qty' type='number' value='oops' step='bad' min='x' max='y'></form>",
    )?;
    page.activate("#f")?;

    page.key_down("#qty", KEY_CODE_UP)?;
    page.assert_value("#qty", "1")?;

    page.key_down("#qty", KEY_CODE_DOWN)?;
    page.key_down("#qty", KEY_CODE_DOWN)?;
    page.assert_value("#qty", "-1")?;
    Ok(())
}
