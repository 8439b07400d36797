use affirm_tui::api::{Affirmation, ApiError, Mood};
use affirm_tui::form::{FormController, SubmitOutcome};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::{Duration, Instant};

/// 送信 → 応答 → リセットの1サイクル（I/Oなし）
fn form_cycle(form: &mut FormController, now: Instant, ok: bool) {
    form.mood = Some(Mood::Anxious);
    form.situation.push_str("  preparing for a job interview  ");
    if let SubmitOutcome::Dispatch { generation, request } = form.submit(now) {
        black_box(&request);
        let result = if ok {
            Ok(Affirmation { text: "I am calm and centered.".into(), id: None, ai_generated: None })
        } else {
            Err(ApiError::Status(500))
        };
        form.complete(generation, result, now);
    }
    form.tick(now + Duration::from_secs(6));
    black_box(form.panels());
    form.reset();
}

fn criterion_benchmark(c: &mut Criterion) {
    let now = Instant::now();
    c.bench_function("form cycle success", |b| {
        let mut form = FormController::default();
        b.iter(|| form_cycle(&mut form, now, true))
    });
    c.bench_function("form cycle error", |b| {
        let mut form = FormController::default();
        b.iter(|| form_cycle(&mut form, now, false))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
