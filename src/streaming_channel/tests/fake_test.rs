#[cfg(test)]
mod fake_test {
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::streaming_channel::impl_fake::StreamingChannelFake;
    use crate::streaming_channel::interface::{ChannelEvent, StreamingChannel};
    use crate::streaming_channel::message::{EncodedImage, FrameMessage, ResultMessage};
    use chrono::{Offset, Utc};
    use std::sync::Arc;

    fn frame(seq: u64) -> FrameMessage {
        FrameMessage {
            seq,
            image: EncodedImage::jpeg(&[0xff, 0xd8, 0xff]),
        }
    }

    fn channel(auto_respond: bool) -> StreamingChannelFake {
        StreamingChannelFake::new(Arc::new(LoggerConsole::new(Utc.fix())), auto_respond)
    }

    #[test]
    fn drops_frames_until_connected() {
        let channel = channel(false);

        channel.send(frame(1));
        channel.connect().unwrap();
        channel.send(frame(2));

        let sent = channel.sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].seq, 2);
    }

    #[test]
    fn auto_respond_answers_each_frame_with_its_sequence() {
        let channel = channel(true);
        let events = channel.events();
        channel.connect().unwrap();

        channel.send(frame(5));

        assert_eq!(events.try_recv().unwrap(), ChannelEvent::Connected);
        match events.try_recv().unwrap() {
            ChannelEvent::Result(result) => {
                assert_eq!(result.seq, Some(5));
                assert_eq!(result.category_values.len(), 7);
                assert!(result.message.starts_with("Detected"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn deliver_and_disconnect_reach_every_subscriber() {
        let channel = channel(false);
        let first = channel.events();
        let second = channel.events();

        channel.deliver(ResultMessage {
            message: "Detected".to_string(),
            ..ResultMessage::default()
        });
        channel.disconnect("gone");

        for events in [first, second] {
            assert!(matches!(events.try_recv().unwrap(), ChannelEvent::Result(_)));
            assert_eq!(
                events.try_recv().unwrap(),
                ChannelEvent::Disconnected {
                    reason: "gone".to_string()
                }
            );
        }
    }

    #[test]
    fn long_runs_keep_only_recent_frames() {
        let channel = channel(false);
        channel.connect().unwrap();

        for seq in 0..20_000 {
            channel.send(frame(seq));
        }

        let recent = channel.sent_frames();
        assert_eq!(channel.sent_count(), 20_000);
        assert!(recent.len() < 1000);
        assert_eq!(recent.last().map(|frame| frame.seq), Some(19_999));
        assert!(recent.windows(2).all(|pair| pair[0].seq + 1 == pair[1].seq));
    }
}
