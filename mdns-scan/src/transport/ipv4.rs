use std::io::IoSliceMut;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::os::unix::io::AsRawFd;
use std::time::Instant;

use nix::errno::Errno;
use nix::sys::socket::{ControlMessageOwned, MsgFlags, SockaddrStorage, recvmsg};
use socket2::{InterfaceIndexOrAddress, Socket};

use shared::error::{Error, Result};
use shared::ifaces::Interface;

use super::{MulticastTransport, Received, read_timeout_until};

/// IPv4 transport. The destination address and arrival interface come from
/// `IP_PKTINFO` where available, `IP_RECVDSTADDR` elsewhere.
pub struct Ipv4Transport {
    socket: Socket,
}

impl Ipv4Transport {
    pub fn new(socket: Socket) -> Self {
        Self { socket }
    }
}

fn group_v4(group: IpAddr) -> Result<Ipv4Addr> {
    match group {
        IpAddr::V4(g) => Ok(g),
        IpAddr::V6(g) => Err(Error::Other(format!("{g} is not an IPv4 group"))),
    }
}

impl MulticastTransport for Ipv4Transport {
    fn join_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()> {
        let group = group_v4(group)?;
        self.socket
            .join_multicast_v4_n(&group, &InterfaceIndexOrAddress::Index(iface.index))?;
        Ok(())
    }

    fn leave_group(&mut self, iface: &Interface, group: IpAddr) -> Result<()> {
        let group = group_v4(group)?;
        self.socket
            .leave_multicast_v4_n(&group, &InterfaceIndexOrAddress::Index(iface.index))?;
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
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let mut cmsg = nix::cmsg_space!(libc::in_pktinfo);
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let mut cmsg = nix::cmsg_space!(libc::in_addr);

        let msg = match recvmsg::<SockaddrStorage>(fd, &mut iov, Some(&mut cmsg), MsgFlags::empty())
        {
            Ok(msg) => msg,
            Err(Errno::EAGAIN | Errno::EINTR) => return Err(Error::ErrTimeout),
            Err(err) => return Err(err.into()),
        };

        let peer_addr = msg
            .address
            .as_ref()
            .and_then(|addr| addr.as_sockaddr_in())
            .map(|sin| SocketAddr::V4(SocketAddrV4::from(*sin)))
            .ok_or_else(|| Error::Other("datagram without an IPv4 source".to_owned()))?;

        let mut received = Received {
            len: msg.bytes,
            peer_addr,
            if_index: None,
            dst_ip: None,
        };
        for cmsg in msg.cmsgs() {
            match cmsg {
                #[cfg(any(target_os = "linux", target_os = "android"))]
                ControlMessageOwned::Ipv4PacketInfo(info) => {
                    // ipi_addr is the header destination, in network order
                    let dst = Ipv4Addr::from(u32::from_be(info.ipi_addr.s_addr));
                    received.dst_ip = Some(IpAddr::V4(dst));
                    received.if_index = Some(info.ipi_ifindex as u32);
                }
                #[cfg(not(any(target_os = "linux", target_os = "android")))]
                ControlMessageOwned::Ipv4RecvDstAddr(addr) => {
                    let dst = Ipv4Addr::from(u32::from_be(addr.s_addr));
                    received.dst_ip = Some(IpAddr::V4(dst));
                }
                _ => {}
            }
        }
        Ok(received)
    }
}
