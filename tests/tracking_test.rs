use bytetrack_counter::{BYTETracker, Detection, TrackerConfig};

fn config(track_buffer: u32) -> TrackerConfig {
    TrackerConfig {
        track_thresh: 0.5,
        low_thresh: 0.1,
        match_thresh: 0.5,
        track_buffer,
    }
}

#[test]
fn test_basic_tracking() {
    let mut tracker = BYTETracker::new(config(30)).unwrap();

    // Frame 1: One detection
    let tracks1 = tracker.update(&[Detection::new(100.0, 100.0, 200.0, 200.0, 0.9)]);
    assert_eq!(tracks1.len(), 1);
    let id1 = tracks1[0].track_id;
    assert_eq!(id1, 1);

    // Frame 2: Same object moved slightly
    let tracks2 = tracker.update(&[Detection::new(105.0, 105.0, 205.0, 205.0, 0.9)]);
    assert_eq!(tracks2.len(), 1);
    assert_eq!(tracks2[0].track_id, id1);

    // Frame 3: Object occluded (low score), kept by the second association
    let tracks3 = tracker.update(&[Detection::new(110.0, 110.0, 210.0, 210.0, 0.2)]);
    assert_eq!(tracks3.len(), 1);
    assert_eq!(tracks3[0].track_id, id1);
    assert_eq!(tracks3[0].score, 0.2);

    // Frame 4: Object disappears, track coasts and is not reported
    let tracks4 = tracker.update(&[]);
    assert!(tracks4.is_empty());
    assert_eq!(tracker.len(), 1);

    // Frame 5: Object reappears within the buffer
    let tracks5 = tracker.update(&[Detection::new(120.0, 120.0, 220.0, 220.0, 0.9)]);
    assert_eq!(tracks5.len(), 1);
    assert_eq!(tracks5[0].track_id, id1);
}

#[test]
fn test_ids_strictly_increasing() {
    let mut tracker = BYTETracker::new(config(2)).unwrap();
    let mut seen = Vec::new();

    for round in 0..4 {
        let x = round as f32 * 500.0;
        let tracks = tracker.update(&[
            Detection::new(x, 0.0, x + 40.0, 80.0, 0.9),
            Detection::new(x, 200.0, x + 40.0, 280.0, 0.9),
        ]);
        for t in &tracks {
            if !seen.contains(&t.track_id) {
                seen.push(t.track_id);
            }
        }
        // let both tracks expire before the next pair appears elsewhere
        tracker.update(&[]);
        tracker.update(&[]);
    }

    assert_eq!(seen.len(), 8);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_coasting_track_rematched_before_buffer_runs_out() {
    let track_buffer = 3;
    let mut tracker = BYTETracker::new(config(track_buffer)).unwrap();
    let det = Detection::new(50.0, 50.0, 90.0, 130.0, 0.9);

    let id = tracker.update(&[det])[0].track_id;
    for _ in 0..track_buffer - 1 {
        assert!(tracker.update(&[]).is_empty());
    }
    assert_eq!(tracker.tracks()[0].lost_frames, track_buffer - 1);

    let tracks = tracker.update(&[det]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, id);
}

#[test]
fn test_track_evicted_after_buffer() {
    let track_buffer = 3;
    let mut tracker = BYTETracker::new(config(track_buffer)).unwrap();
    let det = Detection::new(50.0, 50.0, 90.0, 130.0, 0.9);

    let id = tracker.update(&[det])[0].track_id;
    for _ in 0..track_buffer {
        assert!(tracker.update(&[]).is_empty());
    }
    assert!(tracker.is_empty());

    let tracks = tracker.update(&[det]);
    assert_eq!(tracks.len(), 1);
    assert!(tracks[0].track_id > id);
}

#[test]
fn test_crossing_paths_keep_identity() {
    let mut tracker = BYTETracker::new(config(10)).unwrap();

    // Two objects far apart moving toward each other horizontally on
    // separate rows; the optimal assignment must never swap them.
    let mut ids = None;
    for step in 0..10 {
        let dx = step as f32 * 4.0;
        let tracks = tracker.update(&[
            Detection::new(100.0 + dx, 0.0, 140.0 + dx, 80.0, 0.9),
            Detection::new(400.0 - dx, 100.0, 440.0 - dx, 180.0, 0.8),
        ]);
        assert_eq!(tracks.len(), 2);
        let mut by_row: Vec<(bool, u64)> = tracks.iter().map(|t| (t.rect.y > 50.0, t.track_id)).collect();
        by_row.sort_unstable();
        let current = (by_row[0].1, by_row[1].1);
        match ids {
            None => ids = Some(current),
            Some(prev) => assert_eq!(prev, current),
        }
    }
}

#[test]
fn test_same_stream_same_result() {
    let stream: Vec<Vec<Detection>> = (0..20)
        .map(|i| {
            let x = i as f32 * 3.0;
            let mut frame = vec![Detection::new(x, 10.0, x + 30.0, 70.0, 0.9)];
            if i % 4 != 0 {
                frame.push(Detection::new(200.0, 10.0, 230.0, 70.0, 0.3 + i as f32 * 0.02));
            }
            frame
        })
        .collect();

    let run = || {
        let mut tracker = BYTETracker::new(config(5)).unwrap();
        stream.iter().map(|dets| tracker.update(dets)).collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}
