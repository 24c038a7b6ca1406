use faer::diag::generic::Diag;
use faer::dyn_stack::{MemBuffer, MemStack, StackReq};
use faer::linalg::matmul::matmul;
use faer::linalg::svd::{
    ComputeSvdVectors, SvdError, pseudoinverse_from_svd, pseudoinverse_from_svd_scratch, svd,
    svd_scratch,
};
use faer::{Accum, Mat, MatMut, MatRef, Par};
use reborrow::{Reborrow, ReborrowMut};

/// Scratch memory for faer decompositions, grown on demand.
///
/// The buffer only ever grows: a request is merged with the current requirement,
/// so alternating between smaller and larger systems does not reallocate.
pub struct Workspace {
    req: StackReq,
    buffer: MemBuffer,
}

impl Workspace {
    pub fn empty() -> Self {
        Self {
            req: StackReq::empty(),
            buffer: MemBuffer::new(StackReq::empty()),
        }
    }

    pub fn stack(&mut self, req: StackReq) -> &mut MemStack {
        if self.req.or(req) != self.req {
            self.req = self.req.or(req);
            self.buffer = MemBuffer::new(self.req);
        }

        MemStack::new(&mut self.buffer)
    }
}

impl Clone for Workspace {
    fn clone(&self) -> Self {
        Self {
            req: self.req,
            buffer: MemBuffer::new(self.req),
        }
    }
}

/// Direct solver for small dense square systems via the singular value
/// decomposition. Buffers are kept between calls so repeated solves of the
/// same size do not allocate.
#[derive(Clone)]
pub struct SquareSolve {
    workspace: Workspace,
    /// Singular values, in nonincreasing order.
    s: Vec<f64>,
    u: Mat<f64>,
    v: Mat<f64>,
    pinv: Mat<f64>,
}

impl Default for SquareSolve {
    fn default() -> Self {
        Self {
            workspace: Workspace::empty(),
            s: Vec::default(),
            u: Mat::zeros(0, 0),
            v: Mat::zeros(0, 0),
            pinv: Mat::zeros(0, 0),
        }
    }
}

impl SquareSolve {
    /// Solves `m x = b` for `x`, returning the reciprocal condition number of `m`
    /// (smallest over largest singular value). A value near zero means the
    /// solution is meaningless and should be discarded by the caller.
    pub fn solve(
        &mut self,
        m: MatRef<f64>,
        x: MatMut<f64>,
        b: MatRef<f64>,
    ) -> Result<f64, SvdError> {
        assert!(m.nrows() == m.ncols());
        assert!(x.nrows() == m.ncols() && x.ncols() == b.ncols() && b.nrows() == m.nrows());

        let n = m.nrows();
        let compute = ComputeSvdVectors::Full;
        let par = Par::Seq;

        let svd_reqs = svd_scratch::<f64>(n, n, compute, compute, par, faer::prelude::default());
        let pinv_reqs = pseudoinverse_from_svd_scratch::<f64>(n, n, par);
        let stack = self
            .workspace
            .stack(StackReq::any_of(&[svd_reqs, pinv_reqs]));

        self.s.resize(n, 0.0);
        self.u.resize_with(n, n, |_, _| 0.0);
        self.v.resize_with(n, n, |_, _| 0.0);

        svd(
            m,
            Diag::from_slice_mut(&mut self.s),
            Some(self.u.rb_mut()),
            Some(self.v.rb_mut()),
            par,
            stack,
            faer::prelude::default(),
        )?;

        self.pinv.resize_with(n, n, |_, _| 0.0);
        pseudoinverse_from_svd(
            self.pinv.rb_mut(),
            Diag::from_slice(&self.s),
            self.u.rb(),
            self.v.rb(),
            par,
            stack,
        );

        matmul(x, Accum::Replace, self.pinv.rb(), b, 1.0, par);

        Ok(self.reciprocal_condition())
    }

    fn reciprocal_condition(&self) -> f64 {
        let largest = self.s.iter().copied().fold(0.0, f64::max);
        let smallest = self.s.iter().copied().fold(f64::INFINITY, f64::min);

        if largest > 0.0 && largest.is_finite() {
            smallest / largest
        } else {
            0.0
        }
    }
}
