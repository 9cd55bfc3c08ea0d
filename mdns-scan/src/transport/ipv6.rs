use std::io::IoSliceMut;
use std::net::{IpAddr, Ipv6Addr, SocketAddr, SocketAddrV6};
use std::os::unix::io::AsRawFd;
use std::time::Instant;

use nix::errno::Errno;
use nix::sys::socket::{ControlMessageOwned, MsgFlags, SockaddrStorage, recvmsg};
use socket2::Socket;

use shared::error::{Error, Result};
use shared::ifaces::Interface;

use super::{MulticastTransport, Received, read_timeout_until};

/// IPv6 transport. The destination address and arrival interface come from
/// `IPV6_PKTINFO`.
pub struct Ipv6Transport {
    socket: Socket,
}

impl Ipv6Transport {
    pub fn new(socket: Socket) -> Self {
        Self { socket }
    }
}

fn group_v6(group: IpAddr) -> Result<Ipv6Addr> {
    match group {
        IpAddr::V6(g) => Ok(g),
        IpAddr::V4(g) => Err(Error::Other(format!("{g} is not an IPv6 group"))),
    }
}

impl MulticastTransport for Ipv6Transport {
    fn join_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()> {
        let group = group_v6(group)?;
        self.socket.join_multicast_v6(&group, iface.index)?;
        Ok(())
    }

    fn leave_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()> {
        let group = group_v6(group)?;
        self.socket.leave_multicast_v6(&group, iface.index)?;
        Ok(())
    }

    fn set_read_deadline(&mut self, deadline: Instant) -> Result<()> {
        self.socket
            .set_read_timeout(Some(read_timeout_until(deadline)))?;
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Received> {
        let fd = self.socket.as_raw_fd();
        let mut iov = [IoSliceMut::new(buf)];
        let mut cmsg = nix::cmsg_space!(libc::in6_pktinfo);

        let msg = match recvmsg::<SockaddrStorage>(fd, &mut iov, Some(&mut cmsg), MsgFlags::empty())
        {
            Ok(msg) => msg,
            Err(Errno::EAGAIN | Errno::EINTR) => return Err(Error::ErrTimeout),
            Err(err) => return Err(err.into()),
        };

        let peer_addr = msg
            .address
            .as_ref()
            .and_then(|addr| addr.as_sockaddr_in6())
            .map(|sin6| SocketAddr::V6(SocketAddrV6::from(*sin6)))
            .ok_or_else(|| Error::Other("datagram without an IPv6 source".to_owned()))?;

        let mut received = Received {
            len: msg.bytes,
            peer_addr,
            if_index: None,
            dst_ip: None,
        };
        for cmsg in msg.cmsgs() {
            if let ControlMessageOwned::Ipv6PacketInfo(info) = cmsg {
                received.dst_ip = Some(IpAddr::V6(Ipv6Addr::from(info.ipi6_addr.s6_addr)));
                received.if_index = Some(info.ipi6_ifindex as u32);
            }
        }
        Ok(received)
    }
}
