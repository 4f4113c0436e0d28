use std::{
    fs::File,
    io::{self, Cursor, Read, Seek, Write},
};

/// A seekable, resizable byte resource that a [`Stream`](super::Stream) can wrap.
pub trait RandomAccessFile: Read + Write + Seek {
    /// Sets the resource length, discarding the tail or extending with zeros.
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Forces written data down to durable storage.
    fn sync(&mut self) -> io::Result<()>;
}

impl RandomAccessFile for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(&*self, len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// In-memory resource.
impl RandomAccessFile for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F: RandomAccessFile + ?Sized> RandomAccessFile for Box<F> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        (**self).set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}
