#![no_main]
use libfuzzer_sys::fuzz_target;
use rtcp_buffer::{Buffer, PacketType, RtcpBuffer, XrBlockType};

fuzz_target!(|data: &[u8]| {
    let buffer = Buffer::from_slice(data);
    let _ = buffer.validate();
    let _ = buffer.validate_reduced();

    let mut rtcp = RtcpBuffer::map_readable(&buffer);
    let count = rtcp.packet_count();
    let Some(mut packet) = rtcp.first_packet() else {
        assert_eq!(count, 0);
        return;
    };

    let mut visited = 0;
    loop {
        visited += 1;
        match packet.packet_type() {
            Some(PacketType::Sr) | Some(PacketType::Rr) => {
                for nth in 0..packet.rb_count() {
                    let _ = packet.rb(nth);
                }
                let _ = packet.profile_specific_ext();
            }
            Some(PacketType::Sdes) => {
                let mut more_items = packet.sdes_first_item();
                while more_items {
                    let mut more_entries = packet.sdes_first_entry();
                    while more_entries {
                        let _ = packet.sdes_entry();
                        more_entries = packet.sdes_next_entry();
                    }
                    more_items = packet.sdes_next_item();
                }
            }
            Some(PacketType::Bye) => {
                let _ = packet.bye_reason();
            }
            Some(PacketType::Xr) => {
                let mut more = packet.xr_first_rb();
                while more {
                    match packet.xr_block_type() {
                        Some(XrBlockType::Lrle) | Some(XrBlockType::Drle) => {
                            let _ = packet.xr_rle_nth_chunk(0);
                            if let Some(seqnums) = packet.xr_rle_seqnums() {
                                let _ = seqnums.count();
                            }
                        }
                        Some(XrBlockType::Prt) => {
                            let _ = packet.xr_prt_info();
                        }
                        Some(XrBlockType::Rrt) => {
                            let _ = packet.xr_rrt();
                        }
                        Some(XrBlockType::Dlrr) => {
                            let _ = packet.xr_dlrr_block(0);
                        }
                        Some(XrBlockType::Ssumm) => {
                            let _ = packet.xr_summary_ttl();
                        }
                        Some(XrBlockType::VoipMetrics) => {
                            let _ = packet.xr_voip_metrics();
                        }
                        None => (),
                    }
                    more = packet.xr_next_rb();
                }
            }
            _ => {
                let _ = packet.data();
            }
        }
        if !packet.move_to_next() {
            break;
        }
    }
    assert_eq!(count, visited);
});
