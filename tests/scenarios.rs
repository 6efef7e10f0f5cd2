// SPDX-License-Identifier: MIT OR Apache-2.0

use rtcp_buffer::{
    xr::RleInfo, Buffer, PacketType, PayloadFeedbackType, ReportBlock, RtcpBuffer,
    RtcpParseError, RtcpWriteError, SdesType, SenderInfo, TransportFeedbackType, XrBlockType,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const SENDER_INFO: SenderInfo = SenderInfo {
    ssrc: 0x1234_5678,
    ntp_timestamp: 0,
    rtp_timestamp: 1000,
    packet_count: 5,
    octet_count: 8000,
};

const REPORT_BLOCK: ReportBlock = ReportBlock {
    ssrc: 0xaabb_ccdd,
    fraction_lost: 10,
    packets_lost: -3,
    exthighestseq: 42,
    jitter: 7,
    lsr: 99,
    dlsr: 11,
};

#[test]
fn sender_report_with_report_block() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Sr).unwrap();
        packet.sr_set_sender_info(&SENDER_INFO);
        packet.add_rb(&REPORT_BLOCK).unwrap();
        rtcp.unmap();
    }
    assert_eq!(buffer.size(), 52);
    assert_eq!(buffer.validate(), Ok(()));

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    assert_eq!(rtcp.packet_count(), 1);
    let mut packet = rtcp.first_packet().unwrap();
    assert_eq!(packet.packet_type(), Some(PacketType::Sr));
    assert_eq!(packet.count(), 1);
    assert_eq!(packet.length(), 12);
    assert!(!packet.padding());
    assert_eq!(packet.sr_sender_info(), SENDER_INFO);
    assert_eq!(packet.rb_count(), 1);
    assert_eq!(packet.rb(0), Some(REPORT_BLOCK));
    assert_eq!(packet.rb(1), None);
    assert_eq!(packet.profile_specific_ext_length(), 0);
    assert!(!packet.move_to_next());
    assert!(!packet.is_valid());
}

#[test]
fn bye_with_reason() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        packet.bye_add_ssrcs(&[0x1, 0x2]).unwrap();
        packet.bye_set_reason("bye bye").unwrap();
        assert_eq!(
            packet.bye_add_ssrc(0x3),
            Err(RtcpWriteError::ByeReasonPresent)
        );
    }
    // header, two sources, length byte and 7 bytes of reason
    assert_eq!(buffer.size(), 20);
    assert_eq!(buffer.validate_reduced(), Ok(()));
    assert!(matches!(
        buffer.validate(),
        Err(RtcpParseError::InvalidFirstHeader { .. })
    ));

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    let packet = rtcp.first_packet().unwrap();
    assert_eq!(packet.length(), 4);
    assert_eq!(packet.bye_ssrc_count(), 2);
    assert_eq!(packet.bye_nth_ssrc(0), Some(0x1));
    assert_eq!(packet.bye_nth_ssrc(1), Some(0x2));
    assert_eq!(packet.bye_nth_ssrc(2), None);
    assert_eq!(packet.bye_reason_len(), 7);
    assert_eq!(packet.bye_reason(), Some(&b"bye bye"[..]));
    assert_eq!(packet.bye_reason_string(), Some(Ok("bye bye".to_string())));
}

#[test]
fn unknown_xr_block_type() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Rr).unwrap();
        packet.rr_set_ssrc(0x1234_5678);

        let mut packet = rtcp.add_packet(PacketType::Xr).unwrap();
        packet.xr_set_ssrc(0x1234_5678);
        packet.xr_add_block(99u8, 0x11, &[1, 2, 3, 4]).unwrap();
        packet
            .xr_add_block(XrBlockType::Rrt, 0, &0x0102_0304_0506_0708u64.to_be_bytes())
            .unwrap();
    }
    assert_eq!(buffer.validate(), Ok(()));

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    assert_eq!(rtcp.packet_count(), 2);
    let mut packet = rtcp.first_packet().unwrap();
    assert_eq!(packet.rr_ssrc(), 0x1234_5678);
    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::Xr));
    assert_eq!(packet.xr_ssrc(), 0x1234_5678);

    assert!(packet.xr_first_rb());
    assert_eq!(packet.xr_block_type(), None);
    assert_eq!(packet.xr_block_raw_type(), Some(99));
    assert_eq!(packet.xr_block_length(), 1);

    assert!(packet.xr_next_rb());
    assert_eq!(packet.xr_block_type(), Some(XrBlockType::Rrt));
    assert_eq!(packet.xr_rrt(), Some(0x0102_0304_0506_0708));
    assert!(!packet.xr_next_rb());

    assert!(!packet.move_to_next());
}

#[test]
fn report_block_capacity_exhausted() {
    init_logs();

    let mut buffer = Buffer::new(PacketType::Sr.min_packet_len() + ReportBlock::EXPECTED_SIZE);
    let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
    let mut packet = rtcp.add_packet(PacketType::Sr).unwrap();
    packet.sr_set_sender_info(&SENDER_INFO);
    packet.add_rb(&REPORT_BLOCK).unwrap();

    let count = packet.count();
    let length = packet.length();
    let data = packet.data().to_vec();

    assert_eq!(
        packet.add_rb(&REPORT_BLOCK),
        Err(RtcpWriteError::OutputTooSmall(76))
    );
    assert_eq!(packet.count(), count);
    assert_eq!(packet.length(), length);
    assert_eq!(packet.data(), &data[..]);
    assert_eq!(rtcp.size(), 52);
    assert_eq!(rtcp.data(), &data[..]);
}

#[test]
fn full_compound_packet() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);

        let mut packet = rtcp.add_packet(PacketType::Rr).unwrap();
        packet.rr_set_ssrc(0x1111_1111);
        packet.add_rb(&REPORT_BLOCK).unwrap();
        packet.add_profile_specific_ext(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(
            packet.add_rb(&REPORT_BLOCK),
            Err(RtcpWriteError::ProfileSpecificExtensionPresent)
        );

        let mut packet = rtcp.add_packet(PacketType::Sdes).unwrap();
        packet.sdes_add_item(0x1111_1111).unwrap();
        packet.sdes_add_entry(SdesType::Cname, b"user@host").unwrap();
        packet.sdes_add_entry(SdesType::Tool, b"rtcp-buffer").unwrap();

        let mut packet = rtcp.add_packet(PacketType::Psfb).unwrap();
        packet.fb_set_type(PayloadFeedbackType::Pli);
        packet.fb_set_sender_ssrc(0x1111_1111);
        packet.fb_set_media_ssrc(0x2222_2222);

        let mut packet = rtcp.add_packet(PacketType::Rtpfb).unwrap();
        packet.fb_set_type(TransportFeedbackType::Nack);
        packet.fb_set_sender_ssrc(0x1111_1111);
        packet.fb_set_media_ssrc(0x2222_2222);
        packet.fb_set_fci_length(1).unwrap();
        packet
            .fb_fci_mut()
            .unwrap()
            .copy_from_slice(&[0x00, 0x10, 0x00, 0x05]);

        let mut packet = rtcp.add_packet(PacketType::App).unwrap();
        packet.app_set_subtype(3);
        packet.app_set_ssrc(0x1111_1111);
        packet.app_set_name("test").unwrap();
        packet.app_set_data_length(1).unwrap();
        packet.app_data_mut().unwrap().copy_from_slice(b"data");

        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        packet.bye_add_ssrc(0x1111_1111).unwrap();
    }
    assert_eq!(buffer.validate(), Ok(()));

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    assert_eq!(rtcp.packet_count(), 6);
    // packet counting does not change anything
    assert_eq!(rtcp.packet_count(), 6);

    let mut packet = rtcp.first_packet().unwrap();
    assert_eq!(packet.offset(), 0);
    assert_eq!(packet.rr_ssrc(), 0x1111_1111);
    assert_eq!(packet.rb(0), Some(REPORT_BLOCK));
    assert_eq!(packet.profile_specific_ext_length(), 1);
    assert_eq!(
        packet.copy_profile_specific_ext(),
        Some(vec![0xde, 0xad, 0xbe, 0xef])
    );

    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::Sdes));
    assert!(packet.sdes_first_item());
    assert_eq!(packet.sdes_item_ssrc(), 0x1111_1111);
    assert!(packet.sdes_first_entry());
    assert_eq!(
        packet.sdes_copy_entry(),
        Some((SdesType::Cname, b"user@host".to_vec()))
    );
    assert!(packet.sdes_next_entry());
    assert_eq!(
        packet.sdes_copy_entry(),
        Some((SdesType::Tool, b"rtcp-buffer".to_vec()))
    );
    assert!(!packet.sdes_next_entry());
    assert!(!packet.sdes_next_item());

    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::Psfb));
    assert_eq!(packet.fb_payload_type(), Some(PayloadFeedbackType::Pli));
    assert_eq!(packet.fb_sender_ssrc(), 0x1111_1111);
    assert_eq!(packet.fb_media_ssrc(), 0x2222_2222);
    assert_eq!(packet.fb_fci_length(), 0);
    assert_eq!(packet.fb_fci(), None);

    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::Rtpfb));
    assert_eq!(packet.fb_transport_type(), Some(TransportFeedbackType::Nack));
    assert_eq!(packet.fb_fci_length(), 1);
    assert_eq!(packet.fb_fci(), Some(&[0x00, 0x10, 0x00, 0x05][..]));

    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::App));
    assert_eq!(packet.app_subtype(), 3);
    assert_eq!(packet.app_ssrc(), 0x1111_1111);
    assert_eq!(packet.app_name(), *b"test");
    assert_eq!(packet.app_data_length(), 1);
    assert_eq!(packet.app_data(), Some(&b"data"[..]));

    assert!(packet.move_to_next());
    assert_eq!(packet.packet_type(), Some(PacketType::Bye));
    assert_eq!(packet.bye_nth_ssrc(0), Some(0x1111_1111));
    assert_eq!(packet.bye_reason(), None);

    assert!(!packet.move_to_next());
}

#[test]
fn only_last_packet_grows() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
    rtcp.add_packet(PacketType::Rr).unwrap();
    rtcp.add_packet(PacketType::Bye).unwrap();

    let mut packet = rtcp.first_packet().unwrap();
    assert_eq!(
        packet.add_rb(&REPORT_BLOCK),
        Err(RtcpWriteError::NotLastPacket)
    );
    assert_eq!(packet.count(), 0);
    // fixed size fields can still be written
    packet.rr_set_ssrc(0x4321);

    assert!(packet.move_to_next());
    packet.bye_add_ssrc(0x4321).unwrap();
    assert_eq!(rtcp.size(), 16);
}

#[test]
fn remove_packet() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Rr).unwrap();
        packet.rr_set_ssrc(0x1);
        let mut packet = rtcp.add_packet(PacketType::Sdes).unwrap();
        packet.sdes_add_item(0x1).unwrap();
        packet.sdes_add_entry(SdesType::Cname, b"a").unwrap();
        let mut packet = rtcp.add_packet(PacketType::Bye).unwrap();
        packet.bye_add_ssrc(0x1).unwrap();

        let mut packet = rtcp.first_packet().unwrap();
        assert!(packet.move_to_next());
        assert!(packet.remove());
        assert_eq!(packet.packet_type(), Some(PacketType::Bye));
        assert_eq!(packet.offset(), 8);
        assert!(!packet.remove());
        assert!(!packet.is_valid());
    }
    assert_eq!(buffer.size(), 8);
    assert_eq!(buffer.validate(), Ok(()));
}

#[test]
fn no_packet_after_padding() {
    init_logs();

    // RR followed by a BYE with 4 bytes of padding
    let data = [
        0x80, 0xc9, 0x00, 0x01, 0x12, 0x34, 0x56, 0x78, 0xa1, 0xcb, 0x00, 0x02, 0x12, 0x34,
        0x56, 0x78, 0x00, 0x00, 0x00, 0x04,
    ];
    let mut buffer = Buffer::from_slice(&data);
    assert_eq!(buffer.validate(), Ok(()));

    let mut with_trailer = data.to_vec();
    with_trailer.extend_from_slice(&[0x81, 0xcb, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]);
    assert!(Buffer::from_vec(with_trailer).validate().is_err());

    let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
    assert_eq!(rtcp.packet_count(), 2);
    let mut packet = rtcp.first_packet().unwrap();
    assert!(!packet.padding());
    assert!(packet.move_to_next());
    assert!(packet.padding());
    assert_eq!(packet.bye_nth_ssrc(0), Some(0x1234_5678));
    assert!(!packet.move_to_next());
    assert_eq!(
        rtcp.add_packet(PacketType::Bye).map(|_| ()),
        Err(RtcpWriteError::PaddingPacketPresent)
    );
}

#[test]
fn rle_block_chunks() {
    init_logs();

    let mut buffer = Buffer::new(1400);
    {
        let mut rtcp = RtcpBuffer::map_writable(&mut buffer);
        let mut packet = rtcp.add_packet(PacketType::Xr).unwrap();
        packet
            .xr_add_block(
                XrBlockType::Lrle,
                2,
                &[
                    0x00, 0x00, 0x00, 0x05, // ssrc
                    0x00, 0x10, 0x00, 0x30, // begin, end
                    0x40, 0x10, 0x80, 0x01, // run of ones, bit vector
                ],
            )
            .unwrap();
    }

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    let mut packet = rtcp.first_packet().unwrap();
    assert!(packet.xr_first_rb());
    assert_eq!(packet.xr_block_type(), Some(XrBlockType::Lrle));
    assert_eq!(
        packet.xr_rle_info(),
        Some(RleInfo {
            ssrc: 5,
            thinning: 2,
            begin_seq: 0x10,
            end_seq: 0x30,
            chunk_count: 2,
        })
    );
    assert_eq!(packet.xr_rle_nth_chunk(0), Some(0x4010));
    assert_eq!(packet.xr_rle_nth_chunk(1), Some(0x8001));
    assert_eq!(packet.xr_rle_nth_chunk(2), None);
}
