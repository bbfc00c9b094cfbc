//! RC generator tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rpitx_producers::config::RcParameters;
use rpitx_producers::error::{ProducerError, RcError};
use rpitx_producers::producer::BufferProducer;
use rpitx_producers::rc::{RcBroadcast, RcState};
use rpitx_producers::sample::{decode_samples, RfSample, SAMPLE_SIZE};

fn started() -> RcBroadcast {
    let mut broadcast = RcBroadcast::new();
    broadcast.initialize().unwrap();
    broadcast
}

fn fill_samples<P: BufferProducer>(producer: &mut P, count: usize) -> Vec<RfSample> {
    let mut buf = vec![0u8; count * SAMPLE_SIZE];
    let written = producer.fill(&mut buf).unwrap();
    assert_eq!(written, buf.len());
    decode_samples(&buf).collect()
}

#[test]
fn test_rc_first_cycle_shape() {
    let broadcast = started();
    broadcast
        .set_parameters(RcParameters::with_burst_count(55))
        .unwrap();
    let mut generator = broadcast.producer().unwrap();

    let p = RcParameters::with_burst_count(55);
    let samples = fill_samples(&mut generator, 2 * (4 + 55));

    for pair in samples[..8].chunks_exact(2) {
        assert_eq!(pair[0], RfSample::new(p.frequency, 1000 * p.synchronization_multiple));
        assert_eq!(pair[1], RfSample::new(p.dead_frequency, 1000));
    }
    for pair in samples[8..].chunks_exact(2) {
        assert_eq!(pair[0], RfSample::new(p.frequency, 1000));
        assert_eq!(pair[1], RfSample::new(p.dead_frequency, 1000));
    }
    assert_eq!(generator.cycles_completed(), 1);
    assert_eq!(generator.state(), RcState::Synchronization);
}

#[test]
fn test_rc_cycles_repeat() {
    let broadcast = started();
    let mut generator = broadcast.producer().unwrap();
    let per_cycle = RcParameters::default().samples_per_cycle() as usize;

    let first = fill_samples(&mut generator, per_cycle);
    let second = fill_samples(&mut generator, per_cycle);
    assert_eq!(first, second);
    assert_eq!(generator.cycles_completed(), 2);
}

#[test]
fn test_rc_split_budget_matches_single_fill() {
    let broadcast = started();
    let mut whole = broadcast.producer().unwrap();
    let expected = fill_samples(&mut whole, 300);
    drop(whole);

    let mut split = broadcast.producer().unwrap();
    let mut got = Vec::new();
    for chunk in [1usize, 7, 64, 3, 225] {
        got.extend(fill_samples(&mut split, chunk));
    }
    assert_eq!(got, expected);
}

#[test]
fn test_rc_partial_budget_writes_whole_samples() {
    let broadcast = started();
    let mut generator = broadcast.producer().unwrap();

    let mut buf = vec![0u8; SAMPLE_SIZE * 3 + 5];
    assert_eq!(generator.fill(&mut buf).unwrap(), SAMPLE_SIZE * 3);

    let mut tiny = [0u8; SAMPLE_SIZE - 1];
    assert!(matches!(
        generator.fill(&mut tiny),
        Err(ProducerError::BudgetTooSmall { .. })
    ));
}

#[test]
fn test_rc_update_applied_at_cycle_boundary() {
    let broadcast = started();
    let mut generator = broadcast.producer().unwrap();
    let old = RcParameters::default();
    let new = RcParameters {
        frequency: 27.145,
        ..RcParameters::with_burst_count(10)
    };

    // Stage mid-cycle
    fill_samples(&mut generator, 5);
    broadcast.set_parameters(new).unwrap();

    let rest = fill_samples(&mut generator, old.samples_per_cycle() as usize - 5);
    assert!(rest.iter().all(|s| s.frequency == old.frequency || s.frequency == old.dead_frequency));
    assert_eq!(generator.active_parameters(), &new);

    let next = fill_samples(&mut generator, new.samples_per_cycle() as usize);
    assert_eq!(next[0].frequency, 27.145);
    assert_eq!(next.iter().filter(|s| s.frequency == 27.145).count(), 4 + 10);
}

#[test]
fn test_rc_latest_staged_set_wins() {
    let broadcast = started();
    let mut generator = broadcast.producer().unwrap();

    broadcast.set_parameters(RcParameters::with_burst_count(7)).unwrap();
    broadcast.set_parameters(RcParameters::with_burst_count(9)).unwrap();
    fill_samples(&mut generator, RcParameters::default().samples_per_cycle() as usize);

    assert_eq!(generator.active_parameters().burst_count, 9);
}

/// Internally consistent set keyed by `n`: carrier n MHz, n signal bursts.
fn keyed_params(n: u32) -> RcParameters {
    RcParameters {
        frequency: f64::from(n),
        dead_frequency: f64::from(n) + 0.5,
        burst_us: 10,
        synchronization_burst_count: 2,
        synchronization_multiple: 3,
        burst_count: n,
    }
}

/// The exact samples of one command cycle.
fn cycle_samples(p: &RcParameters) -> Vec<RfSample> {
    let mut out = Vec::new();
    for _ in 0..p.synchronization_burst_count {
        out.push(RfSample::new(p.frequency, p.synchronization_hold()));
        out.push(RfSample::new(p.dead_frequency, p.burst_us));
    }
    for _ in 0..p.burst_count {
        out.push(RfSample::new(p.frequency, p.burst_us));
        out.push(RfSample::new(p.dead_frequency, p.burst_us));
    }
    out
}

#[test]
fn test_rc_concurrent_updates_never_tear() {
    let broadcast = Arc::new(started());
    let mut generator = broadcast.producer().unwrap();
    let done = Arc::new(AtomicBool::new(false));

    // At least the second cycle runs on a keyed set
    broadcast.set_parameters(keyed_params(1)).unwrap();

    let writer = {
        let broadcast = Arc::clone(&broadcast);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut n = 2u32;
            while !done.load(Ordering::Relaxed) {
                broadcast.set_parameters(keyed_params(n)).unwrap();
                n = n % 20 + 1;
            }
        })
    };

    let mut samples = Vec::new();
    let mut buf = vec![0u8; SAMPLE_SIZE * 97];
    for _ in 0..2_000 {
        let written = generator.fill(&mut buf).unwrap();
        samples.extend(decode_samples(&buf[..written]));
    }
    done.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    // Walk the stream cycle by cycle; the first carrier identifies the set
    let defaults = RcParameters::default();
    let mut at = 0;
    let mut cycles: u64 = 0;
    let mut keyed = 0;
    while at < samples.len() {
        let carrier = samples[at].frequency;
        let params = if carrier == defaults.frequency {
            defaults
        } else {
            keyed += 1;
            keyed_params(carrier as u32)
        };
        let expected = cycle_samples(&params);
        if at + expected.len() > samples.len() {
            break;
        }
        assert_eq!(
            &samples[at..at + expected.len()],
            &expected[..],
            "cycle {} starting at sample {}",
            cycles,
            at
        );
        at += expected.len();
        cycles += 1;
    }

    assert_eq!(cycles, generator.cycles_completed());
    assert!(keyed > 0);
}

#[test]
fn test_rc_stop_is_permanent() {
    let mut broadcast = started();
    let mut generator = broadcast.producer().unwrap();
    fill_samples(&mut generator, 10);

    broadcast.stop();
    for size in [0usize, 1, SAMPLE_SIZE, SAMPLE_SIZE * 100] {
        let mut buf = vec![0u8; size];
        assert_eq!(generator.fill(&mut buf).unwrap(), 0);
    }
    assert!(!broadcast.is_initialized());
}

#[test]
fn test_rc_second_producer_rejected() {
    let broadcast = started();
    let generator = broadcast.producer().unwrap();
    assert!(matches!(broadcast.producer(), Err(RcError::AlreadyRunning)));
    assert!(broadcast.is_running());

    drop(generator);
    assert!(!broadcast.is_running());
    assert!(broadcast.producer().is_ok());
}

#[test]
fn test_rc_requires_initialize() {
    let mut broadcast = RcBroadcast::new();
    assert!(matches!(
        broadcast.set_parameters(RcParameters::default()),
        Err(RcError::NotInitialized)
    ));
    assert!(matches!(broadcast.producer(), Err(RcError::NotInitialized)));

    broadcast.initialize().unwrap();
    assert!(matches!(broadcast.initialize(), Err(RcError::AlreadyInitialized)));
}

#[test]
fn test_rc_invalid_parameters_not_staged() {
    let broadcast = started();
    let mut generator = broadcast.producer().unwrap();

    let result = broadcast.set_parameters(RcParameters::with_burst_count(0));
    assert!(matches!(result, Err(RcError::InvalidParameters(_))));

    fill_samples(&mut generator, RcParameters::default().samples_per_cycle() as usize);
    assert_eq!(generator.active_parameters(), &RcParameters::default());
}

#[test]
fn test_rc_reinitialize_after_stop_uses_defaults() {
    let mut broadcast = started();
    broadcast.set_parameters(RcParameters::with_burst_count(12)).unwrap();
    broadcast.stop();

    broadcast.initialize().unwrap();
    let generator = broadcast.producer().unwrap();
    assert_eq!(generator.active_parameters(), &RcParameters::default());
}

#[test]
fn test_rc_independent_broadcasts() {
    let a = started();
    let b = started();
    a.set_parameters(RcParameters::with_burst_count(3)).unwrap();

    let mut ga = a.producer().unwrap();
    let mut gb = b.producer().unwrap();
    let sa = fill_samples(&mut ga, 14);
    let sb = fill_samples(&mut gb, 14);

    assert_eq!(ga.active_parameters().burst_count, 3);
    assert_eq!(gb.active_parameters().burst_count, 50);
    assert_eq!(sa[..8], sb[..8]);
}
